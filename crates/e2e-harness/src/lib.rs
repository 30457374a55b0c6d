//! End-to-end application transaction test
//!
//! Verifies the write and read paths of a replicated kvstore application:
//! generate a node-scoped transaction, submit it synchronously, wait for
//! it to be committed, then confirm the state through an application query.
//!
//! generate -> submit -> wait-for-commit -> mode gate -> (skip | verify)

pub mod config;
pub mod error;
pub mod gate;
pub mod generator;
pub mod run;
pub mod submitter;
pub mod suite;
pub mod verifier;
pub mod waiter;

#[cfg(test)]
mod mock;

pub use config::HarnessConfig;
pub use error::HarnessError;
pub use gate::{mode_gate, GateDecision};
pub use generator::{scoped_key, TransactionGenerator};
pub use run::{AppTxTest, Outcome, RunReport, RunState};
pub use submitter::submit;
pub use suite::{run_suite, select_nodes, SuiteReport};
pub use verifier::verify_state;
pub use waiter::{retry_until, wait_for_commit, RetryOutcome};

/// Number of random bytes in a generated value
pub const VALUE_BYTES: usize = 32;

/// Default key prefix
pub const DEFAULT_TEST_ID: &str = "testapp-tx";

/// Observed commit bound
pub const COMMIT_TIMEOUT_SECS: u64 = 30;

/// Observed commit poll interval
pub const POLL_INTERVAL_MS: u64 = 1000;
