//! Local Node - in-process kvstore testnet
//!
//! This crate provides a small stand-in for a replicated kvstore network:
//! - Key/value application state with `key=value` transactions
//! - Mempool with CheckTx and a duplicate cache
//! - Block production loop committing the mempool every block
//! - Committed transaction index, queryable by hash
//! - Per-node `NodeClient` views and an HTTP JSON-RPC server

pub mod block_producer;
pub mod http_server;
pub mod kv_store;
pub mod mempool;
pub mod methods;
pub mod testnet;
pub mod tx_index;

pub use block_producer::{BlockProducer, BlockProducerConfig, BlockUpdate};
pub use http_server::HttpRpcServer;
pub use kv_store::KvStore;
pub use mempool::Mempool;
pub use testnet::{ChainState, LocalNode, Testnet};
pub use tx_index::TxIndex;

/// Default block time in milliseconds
pub const BLOCK_TIME_MS: u64 = 100;

/// Maximum transactions per block
pub const MAX_TXS_PER_BLOCK: usize = 64;

/// Mempool channel capacity
pub const MEMPOOL_CAPACITY: usize = 1024;

/// CheckTx code for a malformed transaction
pub const CODE_ENCODING_ERROR: u32 = 1;
