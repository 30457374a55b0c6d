//! Shared types for the application end-to-end harness
//!
//! These mirror what a CometBFT-style node reports over RPC:
//! - Transactions and their content hash
//! - Node descriptors consumed from the testnet topology
//! - Broadcast, committed-tx and application query results

pub mod node;
pub mod results;
pub mod tx;

pub use node::{NodeDescriptor, NodeMode};
pub use results::{BroadcastResponse, CommitResult, QueryResult, TxResponse};
pub use tx::{Transaction, TxHash, TxHashParseError};

/// Size of a transaction hash in bytes (SHA-256)
pub const TX_HASH_LEN: usize = 32;

/// Acceptance code reported for a transaction that passed CheckTx
pub const CODE_OK: u32 = 0;
