//! Transaction generation
//!
//! Keys are scoped by node name so concurrent runs against different
//! nodes never touch the same key; values are fresh random bytes so
//! repeated runs against the same testnet never produce a duplicate tx.

use crate::{HarnessConfig, HarnessError, VALUE_BYTES};
use e2e_types::Transaction;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Key for a given test and node: `<test_id>-<node_name>`
pub fn scoped_key(test_id: &str, node_name: &str) -> String {
    format!("{}-{}", test_id, node_name)
}

/// Seed derived from the wall clock, in nanoseconds
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

/// Builds node-scoped key/value transactions from an injectable random source
pub struct TransactionGenerator<R = StdRng> {
    rng: R,
    test_id: String,
}

impl TransactionGenerator<StdRng> {
    /// Reproducible generator
    pub fn seeded(seed: u64, test_id: impl Into<String>) -> Self {
        Self::new(StdRng::seed_from_u64(seed), test_id)
    }

    /// Generator seeded from the wall clock
    pub fn from_clock(test_id: impl Into<String>) -> Self {
        Self::seeded(clock_seed(), test_id)
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed, config.test_id.clone()),
            None => Self::from_clock(config.test_id.clone()),
        }
    }
}

impl<R: RngCore> TransactionGenerator<R> {
    pub fn new(rng: R, test_id: impl Into<String>) -> Self {
        Self {
            rng,
            test_id: test_id.into(),
        }
    }

    /// Generate `<test_id>-<node>=<64 hex chars>`
    pub fn generate(&mut self, node_name: &str) -> Result<Transaction, HarnessError> {
        let mut bz = [0u8; VALUE_BYTES];
        self.rng
            .try_fill_bytes(&mut bz)
            .map_err(|e| HarnessError::RandomSource(e.to_string()))?;

        let key = scoped_key(&self.test_id, node_name);
        let value = hex::encode(bz);
        Ok(Transaction::new(key, value))
    }
}
