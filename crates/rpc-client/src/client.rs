//! The node client interface consumed by the harness

use crate::{RequestContext, RpcError};
use async_trait::async_trait;
use e2e_types::{BroadcastResponse, QueryResult, TxHash, TxResponse};
use std::sync::Arc;

/// Operations the harness needs from a node
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Submit a transaction and wait for its CheckTx result
    async fn broadcast_tx_sync(
        &self,
        ctx: &RequestContext,
        tx: &[u8],
    ) -> Result<BroadcastResponse, RpcError>;

    /// Fetch a committed transaction by hash.
    ///
    /// Returns `RpcError::NotFound` until the transaction is committed.
    async fn tx(
        &self,
        ctx: &RequestContext,
        hash: &TxHash,
        prove: bool,
    ) -> Result<TxResponse, RpcError>;

    /// Query application state; an empty path selects the default handler
    async fn abci_query(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &[u8],
    ) -> Result<QueryResult, RpcError>;

    async fn health(&self, ctx: &RequestContext) -> Result<(), RpcError>;
}

#[async_trait]
impl<T: NodeClient + ?Sized> NodeClient for Arc<T> {
    async fn broadcast_tx_sync(
        &self,
        ctx: &RequestContext,
        tx: &[u8],
    ) -> Result<BroadcastResponse, RpcError> {
        (**self).broadcast_tx_sync(ctx, tx).await
    }

    async fn tx(
        &self,
        ctx: &RequestContext,
        hash: &TxHash,
        prove: bool,
    ) -> Result<TxResponse, RpcError> {
        (**self).tx(ctx, hash, prove).await
    }

    async fn abci_query(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &[u8],
    ) -> Result<QueryResult, RpcError> {
        (**self).abci_query(ctx, path, data).await
    }

    async fn health(&self, ctx: &RequestContext) -> Result<(), RpcError> {
        (**self).health(ctx).await
    }
}
