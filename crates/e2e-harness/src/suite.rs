//! Running the application test across a testnet

use crate::{AppTxTest, HarnessConfig, HarnessError, RunReport};
use e2e_types::NodeDescriptor;
use futures::future::join_all;
use rpc_client::{NodeClient, RequestContext, RpcError};
use std::sync::Arc;

/// Per-node reports for one suite run
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub reports: Vec<RunReport>,
}

impl SuiteReport {
    pub fn passed(&self) -> bool {
        self.reports.iter().all(RunReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunReport> {
        self.reports.iter().filter(|r| !r.passed())
    }
}

/// Nodes the test applies to: stateless nodes are left out, and `filter`
/// restricts the run to a single node name.
pub fn select_nodes<'a>(
    nodes: &'a [NodeDescriptor],
    filter: Option<&str>,
) -> Result<Vec<&'a NodeDescriptor>, HarnessError> {
    if let Some(name) = filter {
        if !nodes.iter().any(|n| n.name == name) {
            return Err(HarnessError::Config(format!("Unknown node {}", name)));
        }
    }

    Ok(nodes
        .iter()
        .filter(|n| !n.mode.is_stateless())
        .filter(|n| filter.map_or(true, |name| n.name == name))
        .collect())
}

/// Run the test against every selected node concurrently.
///
/// Each node gets its own key, so the runs share nothing but the testnet.
pub async fn run_suite<F>(
    config: &HarnessConfig,
    ctx: &RequestContext,
    nodes: &[NodeDescriptor],
    filter: Option<&str>,
    connect: F,
) -> Result<SuiteReport, HarnessError>
where
    F: Fn(&NodeDescriptor) -> Result<Arc<dyn NodeClient>, RpcError>,
{
    config.validate()?;
    let selected = select_nodes(nodes, filter)?;
    tracing::info!("Running app tx test against {} nodes", selected.len());

    let test = AppTxTest::new(config.clone());
    let runs = selected.into_iter().map(|node| {
        let client = connect(node);
        let test = &test;
        async move {
            match client {
                Ok(client) => test.run(ctx, node, &*client).await,
                Err(e) => {
                    RunReport::failed_before_start(node, HarnessError::transport("connect", e))
                }
            }
        }
    });

    let reports = join_all(runs).await;
    Ok(SuiteReport { reports })
}
