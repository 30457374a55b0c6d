//! One application transaction run against one node
//!
//! Start -> Generated -> Submitted -> {Committed | TimedOut}
//!       -> {Skipped | Verified | Failed}

use crate::{
    gate::{mode_gate, GateDecision},
    generator::TransactionGenerator,
    submitter::submit,
    verifier::verify_state,
    waiter::wait_for_commit,
    HarnessConfig, HarnessError,
};
use e2e_types::{NodeDescriptor, NodeMode, Transaction, TxHash};
use rand::RngCore;
use rpc_client::{NodeClient, RequestContext};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// States a run passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Generated,
    Submitted,
    Committed,
    TimedOut,
    Skipped,
    Verified,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::TimedOut | RunState::Skipped | RunState::Verified | RunState::Failed
        )
    }

    pub fn is_success(self) -> bool {
        matches!(self, RunState::Skipped | RunState::Verified)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Terminal outcome of a run
#[derive(Debug)]
pub enum Outcome {
    Verified,
    /// Vacuous success: the node does not hold application state
    Skipped { reason: String },
    Failed(HarnessError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failed(_))
    }
}

/// Everything observed during one run
#[derive(Debug)]
pub struct RunReport {
    pub node: String,
    pub mode: NodeMode,
    pub key: Option<String>,
    pub hash: Option<TxHash>,
    pub commit_height: Option<u64>,
    pub states: Vec<RunState>,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl RunReport {
    /// Report for a node that could not even be reached
    pub fn failed_before_start(node: &NodeDescriptor, error: HarnessError) -> Self {
        Self {
            node: node.name.clone(),
            mode: node.mode,
            key: None,
            hash: None,
            commit_height: None,
            states: vec![RunState::Start, RunState::Failed],
            outcome: Outcome::Failed(error),
            elapsed: Duration::ZERO,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn final_state(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Start)
    }
}

/// Tracks state transitions while a run progresses
struct Progress {
    node: String,
    mode: NodeMode,
    key: Option<String>,
    hash: Option<TxHash>,
    commit_height: Option<u64>,
    states: Vec<RunState>,
    started: Instant,
}

impl Progress {
    fn new(node: &NodeDescriptor) -> Self {
        Self {
            node: node.name.clone(),
            mode: node.mode,
            key: None,
            hash: None,
            commit_height: None,
            states: vec![RunState::Start],
            started: Instant::now(),
        }
    }

    fn advance(&mut self, state: RunState) {
        tracing::debug!("{} -> {}", self.states.last().copied().unwrap_or(RunState::Start), state);
        self.states.push(state);
    }

    fn finish(mut self, terminal: RunState, outcome: Outcome) -> RunReport {
        self.advance(terminal);
        match &outcome {
            Outcome::Verified => tracing::info!("Run verified"),
            Outcome::Skipped { reason } => tracing::info!("Verification skipped: {}", reason),
            Outcome::Failed(e) => tracing::warn!("Run failed: {}", e),
        }
        RunReport {
            node: self.node,
            mode: self.mode,
            key: self.key,
            hash: self.hash,
            commit_height: self.commit_height,
            states: self.states,
            outcome,
            elapsed: self.started.elapsed(),
        }
    }

    fn fail(self, error: HarnessError) -> RunReport {
        self.finish(RunState::Failed, Outcome::Failed(error))
    }
}

/// The "set a value and read it back" test
#[derive(Debug, Clone, Default)]
pub struct AppTxTest {
    config: HarnessConfig,
}

impl AppTxTest {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run against `node` with a generator built from the config
    pub async fn run<C: NodeClient + ?Sized>(
        &self,
        ctx: &RequestContext,
        node: &NodeDescriptor,
        client: &C,
    ) -> RunReport {
        let mut generator = TransactionGenerator::from_config(&self.config);
        self.run_with(ctx, node, client, &mut generator).await
    }

    /// Run against `node` with a caller-supplied generator
    pub async fn run_with<C, R>(
        &self,
        ctx: &RequestContext,
        node: &NodeDescriptor,
        client: &C,
        generator: &mut TransactionGenerator<R>,
    ) -> RunReport
    where
        C: NodeClient + ?Sized,
        R: RngCore,
    {
        let mut progress = Progress::new(node);
        let span = tracing::info_span!("app_tx", node = %node.name, mode = %node.mode);

        let tx = match span.in_scope(|| generator.generate(&node.name)) {
            Ok(tx) => tx,
            Err(e) => return span.in_scope(|| progress.fail(e)),
        };
        progress.key = Some(tx.key().to_string());
        progress.hash = Some(tx.hash());
        span.in_scope(|| progress.advance(RunState::Generated));

        self.drive(ctx, node, client, tx, progress)
            .instrument(span)
            .await
    }

    async fn drive<C: NodeClient + ?Sized>(
        &self,
        ctx: &RequestContext,
        node: &NodeDescriptor,
        client: &C,
        tx: Transaction,
        mut progress: Progress,
    ) -> RunReport {
        let request_timeout = self.config.request_timeout();

        if let Err(e) = submit(client, &ctx.child(request_timeout), &tx).await {
            return progress.fail(e);
        }
        progress.advance(RunState::Submitted);

        match wait_for_commit(client, ctx, &tx, &self.config).await {
            Ok(committed) => {
                progress.commit_height = Some(committed.height);
                progress.advance(RunState::Committed);
            }
            Err(e) if e.is_timeout() => {
                return progress.finish(RunState::TimedOut, Outcome::Failed(e));
            }
            Err(e) => return progress.fail(e),
        }

        match mode_gate(node.mode) {
            GateDecision::Skip { reason } => {
                progress.finish(RunState::Skipped, Outcome::Skipped { reason })
            }
            GateDecision::Verify => {
                match verify_state(client, &ctx.child(request_timeout), &tx).await {
                    Ok(_) => progress.finish(RunState::Verified, Outcome::Verified),
                    Err(e) => progress.fail(e),
                }
            }
        }
    }
}
