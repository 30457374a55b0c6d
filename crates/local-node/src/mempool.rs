//! Mempool - CheckTx and the pending transaction queue

use crate::CODE_ENCODING_ERROR;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use dashmap::DashMap;
use e2e_types::{BroadcastResponse, TxHash, CODE_OK};
use rpc_client::error::INTERNAL_ERROR;
use rpc_client::RpcError;
use std::sync::Arc;

/// Handle for submitting transactions to the block producer
#[derive(Clone)]
pub struct Mempool {
    sender: Sender<Vec<u8>>,
    /// Hashes ever admitted, used to reject duplicates
    cache: Arc<DashMap<TxHash, ()>>,
}

impl Mempool {
    /// Create a mempool and the receiving end for the block producer
    pub fn new(capacity: usize) -> (Self, Receiver<Vec<u8>>) {
        let (sender, receiver) = bounded(capacity);
        let mempool = Self {
            sender,
            cache: Arc::new(DashMap::new()),
        };
        (mempool, receiver)
    }

    /// Run CheckTx and queue the transaction on success.
    ///
    /// Application rejections come back as a non-zero code; duplicate
    /// or unqueueable transactions are RPC errors.
    pub fn check_tx(&self, tx: &[u8]) -> Result<BroadcastResponse, RpcError> {
        let hash = TxHash::of(tx);

        if tx.is_empty() {
            return Ok(BroadcastResponse {
                hash,
                code: CODE_ENCODING_ERROR,
                log: "tx is empty".to_string(),
            });
        }

        if self.cache.insert(hash, ()).is_some() {
            return Err(RpcError::Server {
                code: INTERNAL_ERROR,
                message: "tx already exists in cache".to_string(),
            });
        }

        if let Err(e) = self.sender.try_send(tx.to_vec()) {
            self.cache.remove(&hash);
            let message = match e {
                TrySendError::Full(_) => "mempool is full",
                TrySendError::Disconnected(_) => "mempool is closed",
            };
            return Err(RpcError::Server {
                code: INTERNAL_ERROR,
                message: message.to_string(),
            });
        }

        tracing::debug!("CheckTx accepted {}", hash);
        Ok(BroadcastResponse {
            hash,
            code: CODE_OK,
            log: String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_and_queues() {
        let (mempool, rx) = Mempool::new(4);
        let res = mempool.check_tx(b"k=v").unwrap();
        assert_eq!(res.code, CODE_OK);
        assert_eq!(res.hash, TxHash::of(b"k=v"));
        assert_eq!(rx.try_recv().unwrap(), b"k=v");
    }

    #[test]
    fn test_rejects_empty_with_code() {
        let (mempool, rx) = Mempool::new(4);
        let res = mempool.check_tx(b"").unwrap();
        assert_eq!(res.code, CODE_ENCODING_ERROR);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_rejects_duplicate() {
        let (mempool, _rx) = Mempool::new(4);
        mempool.check_tx(b"k=v").unwrap();
        let err = mempool.check_tx(b"k=v").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_full_mempool_does_not_poison_cache() {
        let (mempool, rx) = Mempool::new(1);
        mempool.check_tx(b"a=1").unwrap();
        assert!(mempool.check_tx(b"b=2").is_err());

        rx.try_recv().unwrap();
        assert_eq!(mempool.check_tx(b"b=2").unwrap().code, CODE_OK);
    }
}
