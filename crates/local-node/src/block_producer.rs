//! Block Producer - commits the mempool at a fixed block time

use crate::{testnet::ChainState, BLOCK_TIME_MS, MAX_TXS_PER_BLOCK};
use crossbeam_channel::{Receiver, TryRecvError};
use e2e_types::TxHash;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

/// A committed block
#[derive(Clone, Debug)]
pub struct BlockUpdate {
    /// Height of the committed block
    pub height: u64,
    /// Hashes of the transactions in the block, in order
    pub tx_hashes: Vec<TxHash>,
}

/// Block producer configuration
#[derive(Clone, Debug)]
pub struct BlockProducerConfig {
    pub block_time_ms: u64,
    pub max_txs_per_block: usize,
    /// Log every block, not only non-empty ones
    pub verbose: bool,
}

impl Default for BlockProducerConfig {
    fn default() -> Self {
        Self {
            block_time_ms: BLOCK_TIME_MS,
            max_txs_per_block: MAX_TXS_PER_BLOCK,
            verbose: false,
        }
    }
}

/// Block Producer
///
/// Drains the mempool every tick and commits the batch as one block.
pub struct BlockProducer {
    chain: Arc<ChainState>,
    tx_receiver: Receiver<Vec<u8>>,
    config: BlockProducerConfig,
    running: Arc<AtomicBool>,
    /// While set, ticks are skipped and transactions stay pending
    paused: Arc<AtomicBool>,
}

impl BlockProducer {
    pub fn new(
        chain: Arc<ChainState>,
        tx_receiver: Receiver<Vec<u8>>,
        config: BlockProducerConfig,
    ) -> Self {
        Self {
            chain,
            tx_receiver,
            config,
            running: Arc::new(AtomicBool::new(true)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn paused_flag(&self) -> Arc<AtomicBool> {
        self.paused.clone()
    }

    /// Drain up to one block of transactions and commit them.
    ///
    /// Returns `None` once the mempool side is gone.
    pub fn produce_block(&mut self) -> Option<BlockUpdate> {
        let tick_start = Instant::now();
        let mut pending_txs = Vec::with_capacity(self.config.max_txs_per_block);

        loop {
            match self.tx_receiver.try_recv() {
                Ok(tx) => {
                    pending_txs.push(tx);
                    if pending_txs.len() >= self.config.max_txs_per_block {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("Mempool channel disconnected");
                    return None;
                }
            }
        }

        let (height, tx_hashes) = self.chain.commit_block(&pending_txs);
        let processing_time = tick_start.elapsed();

        if self.config.verbose || !tx_hashes.is_empty() {
            tracing::debug!(
                "Height {} | {} txs | {:.2}ms",
                height,
                tx_hashes.len(),
                processing_time.as_secs_f64() * 1000.0
            );
        }

        Some(BlockUpdate { height, tx_hashes })
    }

    /// Run the block producer on the tokio runtime
    pub async fn run_async(mut self) {
        let block_duration = Duration::from_millis(self.config.block_time_ms.max(1));
        let mut interval = tokio::time::interval(block_duration);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!("Block producer started ({}ms blocks)", self.config.block_time_ms);

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;
            if self.paused.load(Ordering::SeqCst) {
                continue;
            }
            if self.produce_block().is_none() {
                break;
            }
        }

        tracing::info!("Block producer stopped at height {}", self.chain.height());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mempool;

    #[test]
    fn test_block_commits_pending_in_order() {
        let chain = Arc::new(ChainState::new());
        let (mempool, rx) = Mempool::new(16);
        let mut producer = BlockProducer::new(chain.clone(), rx, BlockProducerConfig::default());

        mempool.check_tx(b"a=1").unwrap();
        mempool.check_tx(b"b=2").unwrap();

        let update = producer.produce_block().unwrap();
        assert_eq!(update.height, 1);
        assert_eq!(update.tx_hashes.len(), 2);

        let committed = chain.index().get(&update.tx_hashes[1]).unwrap();
        assert_eq!(committed.tx, b"b=2");
        assert_eq!(committed.index, 1);
        assert_eq!(chain.store().get(b"a").unwrap(), b"1");
    }

    #[test]
    fn test_block_respects_max_txs() {
        let chain = Arc::new(ChainState::new());
        let (mempool, rx) = Mempool::new(16);
        let config = BlockProducerConfig {
            max_txs_per_block: 2,
            ..Default::default()
        };
        let mut producer = BlockProducer::new(chain.clone(), rx, config);

        for i in 0..3 {
            mempool.check_tx(format!("k{}=v", i).as_bytes()).unwrap();
        }

        assert_eq!(producer.produce_block().unwrap().tx_hashes.len(), 2);
        assert_eq!(producer.produce_block().unwrap().tx_hashes.len(), 1);
        assert_eq!(chain.height(), 2);
    }

    #[test]
    fn test_disconnected_mempool_stops_production() {
        let chain = Arc::new(ChainState::new());
        let (mempool, rx) = Mempool::new(16);
        let mut producer = BlockProducer::new(chain, rx, BlockProducerConfig::default());

        drop(mempool);
        assert!(producer.produce_block().is_none());
    }
}
