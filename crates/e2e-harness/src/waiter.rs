//! Bounded-retry commit waiting
//!
//! `retry_until` is the convergence check: it polls a predicate at a fixed
//! interval until it yields a value or the deadline passes. The predicate
//! decides what is "not yet" (`Ok(None)`) versus a terminal error (`Err`).

use crate::{HarnessConfig, HarnessError};
use e2e_types::{Transaction, TxResponse};
use rpc_client::{NodeClient, RequestContext};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Result of a bounded retry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Success(T),
    Timeout { attempts: u32, waited: Duration },
}

/// Poll `predicate` every `interval` until it yields a value or `deadline` elapses.
///
/// The first attempt runs immediately and a final attempt runs at the
/// deadline. An `Err` from the predicate stops the loop at once.
pub async fn retry_until<T, E, F, Fut>(
    deadline: Duration,
    interval: Duration,
    mut predicate: F,
) -> Result<RetryOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if let Some(value) = predicate().await? {
            return Ok(RetryOutcome::Success(value));
        }

        let waited = start.elapsed();
        if waited >= deadline {
            return Ok(RetryOutcome::Timeout { attempts, waited });
        }
        sleep(interval.min(deadline - waited)).await;
    }
}

/// Wait until the node returns `tx` from a lookup by hash.
///
/// Lookup errors (not found, transport hiccups) count as "not yet"; a
/// committed transaction with different bytes is a correctness failure.
///
/// The commit window (the smaller of the caller's remaining time and the
/// commit timeout) decides when lookups start. Each lookup, including the
/// one made at the end of the window, gets its own `request_timeout`.
pub async fn wait_for_commit<C: NodeClient + ?Sized>(
    client: &C,
    ctx: &RequestContext,
    tx: &Transaction,
    config: &HarnessConfig,
) -> Result<TxResponse, HarnessError> {
    let window = match ctx.remaining() {
        Some(remaining) => remaining.min(config.commit_timeout()),
        None => config.commit_timeout(),
    };
    let hash = tx.hash();
    let request_timeout = config.request_timeout();
    let prove = config.fetch_with_proof;

    let outcome = retry_until(window, config.poll_interval(), move || async move {
        let attempt_ctx = RequestContext::with_timeout(request_timeout);
        match client.tx(&attempt_ctx, &hash, prove).await {
            Ok(found) if found.tx == tx.raw() => Ok(Some(found)),
            Ok(found) => Err(HarnessError::CommittedTxMismatch {
                hash,
                expected: String::from_utf8_lossy(tx.raw()).into_owned(),
                actual: String::from_utf8_lossy(&found.tx).into_owned(),
            }),
            Err(e) => {
                tracing::debug!("tx {} not committed yet: {}", hash, e);
                Ok(None)
            }
        }
    })
    .await?;

    match outcome {
        RetryOutcome::Success(found) => {
            tracing::info!("Tx {} committed at height {}", hash, found.height);
            Ok(found)
        }
        RetryOutcome::Timeout { attempts, waited } => {
            tracing::warn!("Tx {} not committed after {:?}", hash, waited);
            Err(HarnessError::CommitTimeout {
                hash,
                waited,
                attempts,
            })
        }
    }
}
