//! Committed transaction index

use dashmap::DashMap;
use e2e_types::{TxHash, TxResponse};
use std::sync::Arc;

/// Committed transactions keyed by content hash
#[derive(Clone, Default)]
pub struct TxIndex {
    txs: Arc<DashMap<TxHash, TxResponse>>,
}

impl TxIndex {
    pub fn index(&self, tx: &[u8], height: u64, index: u32) -> TxHash {
        let hash = TxHash::of(tx);
        self.txs.insert(
            hash,
            TxResponse {
                hash,
                height,
                index,
                tx: tx.to_vec(),
            },
        );
        hash
    }

    pub fn get(&self, hash: &TxHash) -> Option<TxResponse> {
        self.txs.get(hash).map(|r| r.value().clone())
    }
}
