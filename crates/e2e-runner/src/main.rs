//! App E2E Runner
//!
//! Runs the application transaction test against every stateful node of a
//! testnet, either remote nodes listed in a TOML manifest or an in-process
//! kvstore testnet. Exits non-zero when any node fails.

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use e2e_harness::{run_suite, Outcome, SuiteReport};
use e2e_types::NodeDescriptor;
use local_node::Testnet;
use rpc_client::{HttpClientConfig, HttpNodeClient, NodeClient, RequestContext, RpcError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod manifest;

use manifest::Manifest;

/// Application transaction end-to-end test
#[derive(Parser, Debug)]
#[command(name = "app-e2e")]
#[command(
    about = "Submit a transaction to each node and verify it reaches app state",
    long_about = None
)]
struct Args {
    /// Testnet manifest (TOML)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Run against an in-process testnet
    #[arg(long)]
    local: bool,

    /// Serve the in-process nodes over HTTP and test through JSON-RPC
    #[arg(long, requires = "local")]
    local_http: bool,

    /// Validators in the default local topology
    #[arg(long, default_value = "2")]
    validators: usize,

    /// Local block time in milliseconds
    #[arg(long)]
    block_time_ms: Option<u64>,

    /// Only test this node
    #[arg(long, env = "E2E_NODE")]
    node: Option<String>,

    /// Key prefix for generated transactions
    #[arg(long)]
    test_id: Option<String>,

    /// Fixed RNG seed for generated values
    #[arg(long)]
    seed: Option<u64>,

    /// Commit timeout in seconds
    #[arg(long)]
    commit_timeout_secs: Option<u64>,

    /// Commit poll interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Overall deadline for the whole suite in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let manifest = load_manifest(&args)?;
    let ctx = match args.deadline_secs {
        Some(secs) => RequestContext::with_timeout(Duration::from_secs(secs)),
        None => RequestContext::background(),
    };

    let started = Utc::now();
    tracing::info!("Starting app tx test at {}", started.to_rfc3339());
    tracing::info!("  Test id: {}", manifest.harness.test_id);
    tracing::info!("  Commit timeout: {:?}", manifest.harness.commit_timeout());
    tracing::info!("  Poll interval: {:?}", manifest.harness.poll_interval());

    let report = tokio::select! {
        report = run(&args, &manifest, &ctx) => report?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping test run");
            bail!("interrupted");
        }
    };

    print_report(&report, started);

    if !report.passed() {
        bail!(
            "{} of {} node runs failed",
            report.failures().count(),
            report.reports.len()
        );
    }
    Ok(())
}

fn load_manifest(args: &Args) -> Result<Manifest> {
    let mut manifest = match (&args.manifest, args.local) {
        (Some(path), _) => Manifest::load(path)?,
        (None, true) => Manifest::local_default(args.validators),
        (None, false) => bail!("either --manifest or --local is required"),
    };

    let harness = &mut manifest.harness;
    if let Some(test_id) = &args.test_id {
        harness.test_id = test_id.clone();
    }
    if let Some(seed) = args.seed {
        harness.seed = Some(seed);
    }
    if let Some(secs) = args.commit_timeout_secs {
        harness.commit_timeout_secs = secs;
    }
    if let Some(ms) = args.poll_interval_ms {
        harness.poll_interval_ms = ms;
    }
    if let Some(ms) = args.block_time_ms {
        manifest.local.block_time_ms = ms;
    }

    manifest.validate()?;
    Ok(manifest)
}

async fn run(args: &Args, manifest: &Manifest, ctx: &RequestContext) -> Result<SuiteReport> {
    if !args.local {
        let missing = manifest.missing_rpc_addrs();
        if !missing.is_empty() {
            tracing::warn!("Nodes without rpc_addr: {}", missing.join(", "));
        }
        return run_remote(manifest, &manifest.nodes, args.node.as_deref(), ctx).await;
    }

    let producer = manifest.local.producer_config(args.verbose);
    tracing::info!(
        "Starting local testnet: {} nodes, block time {}ms",
        manifest.nodes.len(),
        producer.block_time_ms
    );
    let testnet = Testnet::start(producer, manifest.nodes.clone());

    if args.local_http {
        let mut nodes = Vec::with_capacity(manifest.nodes.len());
        for node in testnet.descriptors() {
            let addr = testnet.serve(&node.name, "127.0.0.1:0").await?;
            tracing::info!("  {} ({}) serving on {}", node.name, node.mode, addr);
            nodes.push(node.clone().with_rpc_addr(format!("http://{}", addr)));
        }
        return run_remote(manifest, &nodes, args.node.as_deref(), ctx).await;
    }

    let filter = args.node.as_deref();
    let report = run_suite(&manifest.harness, ctx, testnet.descriptors(), filter, |node| {
        testnet
            .node(&node.name)
            .map(|n| Arc::new(n) as Arc<dyn NodeClient>)
            .ok_or_else(|| RpcError::Transport(format!("no local node {}", node.name)))
    })
    .await?;

    tracing::info!("Local testnet reached height {}", testnet.height());
    Ok(report)
}

async fn run_remote(
    manifest: &Manifest,
    nodes: &[NodeDescriptor],
    filter: Option<&str>,
    ctx: &RequestContext,
) -> Result<SuiteReport> {
    let request_timeout = manifest.harness.request_timeout();
    let report = run_suite(&manifest.harness, ctx, nodes, filter, |node| {
        if node.rpc_addr.is_empty() {
            return Err(RpcError::Transport(format!("node {} has no rpc_addr", node.name)));
        }
        let config = HttpClientConfig {
            url: node.rpc_addr.clone(),
            request_timeout,
            ..Default::default()
        };
        HttpNodeClient::new(&config).map(|c| Arc::new(c) as Arc<dyn NodeClient>)
    })
    .await?;
    Ok(report)
}

fn print_report(report: &SuiteReport, started: chrono::DateTime<Utc>) {
    println!();
    println!("App tx test ({})", started.format("%Y-%m-%d %H:%M:%S UTC"));
    for run in &report.reports {
        let detail = match &run.outcome {
            Outcome::Verified => match run.commit_height {
                Some(height) => format!("committed at height {}", height),
                None => String::new(),
            },
            Outcome::Skipped { reason } => reason.clone(),
            Outcome::Failed(e) => e.to_string(),
        };
        println!(
            "  {:<16} {:<10} {:<9} {:>9}  {}",
            run.node,
            run.mode.to_string(),
            run.final_state().to_string(),
            format!("{:.2?}", run.elapsed),
            detail
        );
    }

    let failed = report.failures().count();
    println!(
        "{} passed, {} failed in {:.1}s",
        report.reports.len() - failed,
        failed,
        (Utc::now() - started).num_milliseconds() as f64 / 1000.0
    );
}
