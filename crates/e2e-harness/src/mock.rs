//! Scripted node client for unit tests

use async_trait::async_trait;
use e2e_types::{BroadcastResponse, QueryResult, Transaction, TxHash, TxResponse};
use parking_lot::Mutex;
use rpc_client::{NodeClient, RequestContext, RpcError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Node double whose answers are scripted per test.
///
/// Every call goes through the request context, so expired contexts never
/// reach the scripted answers or the call counters.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    broadcast: Mutex<Option<Result<BroadcastResponse, RpcError>>>,
    /// Number of `tx` polls answered with not-found before the tx appears
    commit_after: Mutex<Option<u32>>,
    /// When set, the tx becomes visible at this instant instead
    commit_at: Mutex<Option<Instant>>,
    committed_bytes: Mutex<Option<Vec<u8>>>,
    query: Mutex<Option<Result<QueryResult, RpcError>>>,
    last_raw: Mutex<Vec<u8>>,
    pub tx_calls: AtomicU32,
    pub query_calls: AtomicU32,
}

impl ScriptedClient {
    /// Accepts and commits immediately, answers queries from the last tx
    pub fn new() -> Self {
        let client = Self::default();
        *client.commit_after.lock() = Some(0);
        client
    }

    pub fn commit_after(self, polls: u32) -> Self {
        *self.commit_after.lock() = Some(polls);
        self
    }

    /// Make the tx visible once `after` has passed
    pub fn commit_at(self, after: Duration) -> Self {
        *self.commit_at.lock() = Some(Instant::now() + after);
        self
    }

    pub fn never_commit(self) -> Self {
        *self.commit_after.lock() = None;
        self
    }

    pub fn broadcast_result(self, res: Result<BroadcastResponse, RpcError>) -> Self {
        *self.broadcast.lock() = Some(res);
        self
    }

    pub fn committed_bytes(self, bytes: &[u8]) -> Self {
        *self.committed_bytes.lock() = Some(bytes.to_vec());
        self
    }

    pub fn query_result(self, res: Result<QueryResult, RpcError>) -> Self {
        *self.query.lock() = Some(res);
        self
    }

    pub fn tx_calls(&self) -> u32 {
        self.tx_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> u32 {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for ScriptedClient {
    async fn broadcast_tx_sync(
        &self,
        ctx: &RequestContext,
        tx: &[u8],
    ) -> Result<BroadcastResponse, RpcError> {
        ctx.bound(async {
            *self.last_raw.lock() = tx.to_vec();
            let scripted = self.broadcast.lock().clone();
            scripted.unwrap_or_else(|| {
                Ok(BroadcastResponse {
                    hash: TxHash::of(tx),
                    code: 0,
                    log: String::new(),
                })
            })
        })
        .await?
    }

    async fn tx(
        &self,
        ctx: &RequestContext,
        hash: &TxHash,
        _prove: bool,
    ) -> Result<TxResponse, RpcError> {
        ctx.bound(async {
            let calls = self.tx_calls.fetch_add(1, Ordering::SeqCst);
            let commit_at = *self.commit_at.lock();
            let commit_after = *self.commit_after.lock();
            let visible = match commit_at {
                Some(at) => Instant::now() >= at,
                None => matches!(commit_after, Some(n) if calls >= n),
            };
            if !visible {
                return Err(RpcError::NotFound(format!("tx ({}) not found", hash)));
            }

            let committed = self.committed_bytes.lock().clone();
            let tx = committed.unwrap_or_else(|| self.last_raw.lock().clone());
            Ok(TxResponse {
                hash: *hash,
                height: 5,
                index: 0,
                tx,
            })
        })
        .await?
    }

    async fn abci_query(
        &self,
        ctx: &RequestContext,
        _path: &str,
        data: &[u8],
    ) -> Result<QueryResult, RpcError> {
        ctx.bound(async {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            let scripted = self.query.lock().clone();
            if let Some(res) = scripted {
                return res;
            }

            let raw = self.last_raw.lock().clone();
            let value = Transaction::from_raw(&raw)
                .filter(|tx| tx.key().as_bytes() == data)
                .map(|tx| tx.value().as_bytes().to_vec())
                .unwrap_or_default();
            Ok(QueryResult {
                key: data.to_vec(),
                value,
                ..Default::default()
            })
        })
        .await?
    }

    async fn health(&self, ctx: &RequestContext) -> Result<(), RpcError> {
        ctx.bound(async { Ok(()) }).await?
    }
}
