//! Harness errors

use e2e_types::TxHash;
use rpc_client::RpcError;
use std::time::Duration;
use thiserror::Error;

/// Why an application transaction run failed
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Random source failed: {0}")]
    RandomSource(String),

    #[error("{op} failed: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: RpcError,
    },

    #[error("Transaction rejected with code {code}: {log}")]
    Rejected { code: u32, log: String },

    #[error("Hash mismatch: computed {expected}, node returned {actual}")]
    HashMismatch { expected: TxHash, actual: TxHash },

    #[error("Submitted tx {hash} wasn't committed after {waited:?} ({attempts} attempts)")]
    CommitTimeout {
        hash: TxHash,
        waited: Duration,
        attempts: u32,
    },

    #[error("Committed tx {hash} has other bytes: expected {expected:?}, got {actual:?}")]
    CommittedTxMismatch {
        hash: TxHash,
        expected: String,
        actual: String,
    },

    #[error("Query {field} mismatch: expected {expected:?}, got {actual:?}")]
    StateMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Invalid config: {0}")]
    Config(String),
}

impl HarnessError {
    pub fn transport(op: &'static str, source: RpcError) -> Self {
        HarnessError::Transport { op, source }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, HarnessError::CommitTimeout { .. })
    }
}
