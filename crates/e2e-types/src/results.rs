//! Results returned by node RPC calls

use crate::{TxHash, CODE_OK};

/// Response to a synchronous broadcast (CheckTx result)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastResponse {
    /// Hash the node computed for the submitted bytes
    pub hash: TxHash,
    /// CheckTx code, 0 means accepted into the mempool
    pub code: u32,
    /// Application log (rejection reason, if any)
    pub log: String,
}

/// Outcome of a submission, pairing the local hash with what the node returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    /// Hash computed locally from the raw bytes
    pub hash: TxHash,
    pub acceptance_code: u32,
    /// Hash reported by the node
    pub returned_hash: TxHash,
}

impl CommitResult {
    pub fn is_accepted(&self) -> bool {
        self.acceptance_code == CODE_OK
    }

    pub fn hashes_match(&self) -> bool {
        self.hash == self.returned_hash
    }
}

/// A committed transaction fetched by hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxResponse {
    pub hash: TxHash,
    /// Block height the transaction was included at
    pub height: u64,
    /// Index within the block
    pub index: u32,
    /// Raw transaction bytes
    pub tx: Vec<u8>,
}

/// Response to an application query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryResult {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub code: u32,
    pub log: String,
    /// Height the query was answered at
    pub height: u64,
}
