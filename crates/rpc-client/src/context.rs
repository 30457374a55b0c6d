//! Per-call request context

use crate::RpcError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Caller-supplied context for a single RPC call.
///
/// Carries an optional absolute deadline. There is no process-wide
/// context: every operation receives the one it should honor.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context without a deadline
    pub fn background() -> Self {
        Self { deadline: None }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    /// A context expiring after `timeout`; unbounded if the deadline is unrepresentable
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Derive a context bounded by both `timeout` and this context's deadline
    pub fn child(&self, timeout: Duration) -> Self {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(parent), Some(candidate)) => Some(parent.min(candidate)),
            (parent, candidate) => parent.or(candidate),
        };
        Self { deadline }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` if unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.deadline, Some(d) if Instant::now() >= d)
    }

    /// Run `fut` bounded by this context's deadline
    pub async fn bound<F: Future>(&self, fut: F) -> Result<F::Output, RpcError> {
        if self.is_expired() {
            return Err(RpcError::DeadlineExceeded);
        }
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| RpcError::DeadlineExceeded),
            None => Ok(fut.await),
        }
    }
}
