//! Harness configuration

use crate::{HarnessError, COMMIT_TIMEOUT_SECS, DEFAULT_TEST_ID, POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for any configured timeout, one day
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Prefix for generated keys, `<test_id>-<node name>`
    pub test_id: String,
    /// How long a submitted transaction may take to commit
    pub commit_timeout_secs: u64,
    /// Delay between commit polls in milliseconds
    pub poll_interval_ms: u64,
    /// Bound on each individual RPC call
    pub request_timeout_secs: u64,
    /// Fixed RNG seed; `None` seeds from the wall clock
    pub seed: Option<u64>,
    /// Ask for an inclusion proof when fetching the committed tx
    pub fetch_with_proof: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_id: DEFAULT_TEST_ID.to_string(),
            commit_timeout_secs: COMMIT_TIMEOUT_SECS,
            poll_interval_ms: POLL_INTERVAL_MS,
            request_timeout_secs: 10,
            seed: None,
            fetch_with_proof: false,
        }
    }
}

impl HarnessConfig {
    pub fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.commit_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.test_id.is_empty() {
            return Err(HarnessError::Config("test_id must not be empty".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(HarnessError::Config("poll_interval_ms must be > 0".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(HarnessError::Config(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }
        for (name, secs) in [
            ("commit_timeout_secs", self.commit_timeout_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if secs > MAX_TIMEOUT_SECS {
                return Err(HarnessError::Config(format!(
                    "{} must be <= {}, got {}",
                    name, MAX_TIMEOUT_SECS, secs
                )));
            }
        }
        if self.poll_interval() > self.commit_timeout() {
            return Err(HarnessError::Config(format!(
                "poll interval {:?} exceeds commit timeout {:?}",
                self.poll_interval(),
                self.commit_timeout()
            )));
        }
        Ok(())
    }
}
