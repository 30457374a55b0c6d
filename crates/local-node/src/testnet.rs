//! Local testnet - shared chain state and per-node client views

use crate::{
    block_producer::{BlockProducer, BlockProducerConfig},
    http_server::HttpRpcServer,
    kv_store::KvStore,
    mempool::Mempool,
    tx_index::TxIndex,
    MEMPOOL_CAPACITY,
};
use async_trait::async_trait;
use e2e_types::{BroadcastResponse, NodeDescriptor, NodeMode, QueryResult, TxHash, TxResponse};
use rpc_client::{NodeClient, RequestContext, RpcError};
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Replicated state every node of the testnet observes
#[derive(Default)]
pub struct ChainState {
    store: KvStore,
    index: TxIndex,
    height: AtomicU64,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &KvStore {
        &self.store
    }

    pub fn index(&self) -> &TxIndex {
        &self.index
    }

    pub fn height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }

    /// Commit a block of transactions at the next height.
    ///
    /// Only the block producer calls this.
    pub fn commit_block(&self, txs: &[Vec<u8>]) -> (u64, Vec<TxHash>) {
        let height = self.height() + 1;
        let mut hashes = Vec::with_capacity(txs.len());

        for (i, tx) in txs.iter().enumerate() {
            self.store.apply_tx(tx);
            hashes.push(self.index.index(tx, height, i as u32));
        }

        self.height.store(height, Ordering::SeqCst);
        (height, hashes)
    }
}

/// One node's view onto the testnet
#[derive(Clone)]
pub struct LocalNode {
    descriptor: NodeDescriptor,
    chain: Arc<ChainState>,
    mempool: Mempool,
}

impl LocalNode {
    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn mode(&self) -> NodeMode {
        self.descriptor.mode
    }

    fn ensure_rpc(&self) -> Result<(), RpcError> {
        if self.mode().is_stateless() {
            return Err(RpcError::Unsupported(format!(
                "seed node {} has no RPC",
                self.name()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NodeClient for LocalNode {
    async fn broadcast_tx_sync(
        &self,
        ctx: &RequestContext,
        tx: &[u8],
    ) -> Result<BroadcastResponse, RpcError> {
        ctx.bound(async {
            self.ensure_rpc()?;
            self.mempool.check_tx(tx)
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
            self.ensure_rpc()?;
            self.chain
                .index()
                .get(hash)
                .ok_or_else(|| RpcError::NotFound(format!("tx ({}) not found", hash)))
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
            self.ensure_rpc()?;
            if !self.mode().serves_app_state() {
                return Err(RpcError::Unsupported(format!(
                    "{} node {} does not serve application queries",
                    self.mode(),
                    self.name()
                )));
            }
            Ok(self.chain.store().query(data, self.chain.height()))
        })
        .await?
    }

    async fn health(&self, ctx: &RequestContext) -> Result<(), RpcError> {
        ctx.bound(async { self.ensure_rpc() }).await?
    }
}

/// In-process testnet: one chain, several named node views
pub struct Testnet {
    chain: Arc<ChainState>,
    mempool: Mempool,
    nodes: Vec<NodeDescriptor>,
    running: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl Testnet {
    /// Start block production for a testnet with the given nodes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: BlockProducerConfig, nodes: Vec<NodeDescriptor>) -> Self {
        let chain = Arc::new(ChainState::new());
        let (mempool, rx) = Mempool::new(MEMPOOL_CAPACITY);
        let producer = BlockProducer::new(chain.clone(), rx, config);

        let testnet = Self {
            chain,
            mempool,
            nodes,
            running: producer.running_flag(),
            paused: producer.paused_flag(),
        };

        tokio::spawn(producer.run_async());
        tracing::info!("Local testnet started with {} nodes", testnet.nodes.len());
        testnet
    }

    pub fn descriptors(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<LocalNode> {
        self.nodes
            .iter()
            .find(|n| n.name == name)
            .map(|descriptor| self.view(descriptor.clone()))
    }

    pub fn nodes(&self) -> Vec<LocalNode> {
        self.nodes.iter().cloned().map(|d| self.view(d)).collect()
    }

    fn view(&self, descriptor: NodeDescriptor) -> LocalNode {
        LocalNode {
            descriptor,
            chain: self.chain.clone(),
            mempool: self.mempool.clone(),
        }
    }

    pub fn chain(&self) -> &Arc<ChainState> {
        &self.chain
    }

    pub fn height(&self) -> u64 {
        self.chain.height()
    }

    /// Stop committing blocks; submitted transactions stay pending
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Wait until the chain reaches `height`
    pub async fn wait_for_height(&self, height: u64, wait: Duration) -> anyhow::Result<()> {
        const POLL_INTERVAL: Duration = Duration::from_millis(10);

        timeout(wait, async {
            while self.height() < height {
                sleep(POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| anyhow::anyhow!("Timeout waiting for height {} after {:?}", height, wait))
    }

    /// Serve a node's RPC over HTTP, returning the bound address
    pub async fn serve(&self, name: &str, addr: &str) -> anyhow::Result<SocketAddr> {
        let node = self
            .node(name)
            .ok_or_else(|| anyhow::anyhow!("Unknown node {}", name))?;
        HttpRpcServer::new(Arc::new(node)).spawn(addr).await
    }
}

impl Drop for Testnet {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
