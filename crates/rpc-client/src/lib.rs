//! RPC Client - node access for the end-to-end harness
//!
//! Provides the client side of a CometBFT-compatible RPC interface:
//! - `NodeClient` trait: broadcast_tx_sync, tx, abci_query, health
//! - `RequestContext`: explicit per-call deadline
//! - `HttpNodeClient`: JSON-RPC over HTTP via jsonrpsee
//! - `wire`: JSON shapes shared with servers speaking the same protocol

pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod wire;

pub use client::NodeClient;
pub use context::RequestContext;
pub use error::RpcError;
pub use http::{HttpClientConfig, HttpNodeClient};
