//! Application transaction test against the local kvstore testnet
//!
//! Covers the full flow over both the in-process client and HTTP JSON-RPC:
//! - Verified runs on validator and full nodes
//! - Skipped runs on light nodes, seed nodes left out
//! - Commit timeout when the chain stops producing blocks
//! - Repeated runs against the same testnet

use std::sync::Arc;
use std::time::Duration;

use e2e_harness::{run_suite, AppTxTest, HarnessConfig, HarnessError, Outcome, RunState};
use e2e_types::{NodeDescriptor, NodeMode, TxHash};
use local_node::{BlockProducerConfig, Testnet};
use rpc_client::{HttpNodeClient, NodeClient, RequestContext};

fn topology() -> Vec<NodeDescriptor> {
    vec![
        NodeDescriptor::new("seed01", NodeMode::Seed),
        NodeDescriptor::new("validator01", NodeMode::Validator),
        NodeDescriptor::new("validator02", NodeMode::Validator),
        NodeDescriptor::new("full01", NodeMode::Full),
        NodeDescriptor::new("light01", NodeMode::Light),
    ]
}

fn fast_blocks() -> BlockProducerConfig {
    BlockProducerConfig {
        block_time_ms: 20,
        ..Default::default()
    }
}

fn fast_polling() -> HarnessConfig {
    HarnessConfig {
        commit_timeout_secs: 10,
        poll_interval_ms: 50,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_suite_against_local_testnet() {
    let testnet = Testnet::start(fast_blocks(), topology());
    let ctx = RequestContext::with_timeout(Duration::from_secs(30));

    let report = run_suite(&fast_polling(), &ctx, testnet.descriptors(), None, |node| {
        testnet
            .node(&node.name)
            .map(|n| Arc::new(n) as Arc<dyn NodeClient>)
            .ok_or_else(|| rpc_client::RpcError::NotFound(node.name.clone()))
    })
    .await
    .unwrap();

    assert!(report.passed(), "{:#?}", report);
    assert_eq!(report.reports.len(), 4);

    for run in &report.reports {
        let expected = if run.mode == NodeMode::Light {
            RunState::Skipped
        } else {
            RunState::Verified
        };
        assert_eq!(run.final_state(), expected, "node {}", run.node);
    }

    // Every node wrote its own key
    let store = testnet.chain().store();
    for name in ["validator01", "validator02", "full01", "light01"] {
        let key = format!("testapp-tx-{}", name);
        let value = store.get(key.as_bytes()).expect("key committed");
        assert_eq!(value.len(), 64);
    }
    assert!(store.get(b"testapp-tx-seed01").is_none());
}

#[tokio::test]
async fn test_run_over_http_json_rpc() {
    let testnet = Testnet::start(fast_blocks(), topology());
    let addr = testnet.serve("full01", "127.0.0.1:0").await.unwrap();
    let client = HttpNodeClient::connect(&addr.to_string()).unwrap();

    let node = testnet.node("full01").unwrap().descriptor().clone();
    let report = AppTxTest::new(fast_polling())
        .run(&RequestContext::background(), &node, &client)
        .await;

    assert_eq!(report.final_state(), RunState::Verified, "{:?}", report.outcome);
    assert!(report.commit_height.unwrap() >= 1);
}

#[tokio::test]
async fn test_http_lookup_of_unknown_tx_is_not_found() {
    let testnet = Testnet::start(fast_blocks(), topology());
    let addr = testnet.serve("validator01", "127.0.0.1:0").await.unwrap();
    let client = HttpNodeClient::connect(&addr.to_string()).unwrap();
    let ctx = RequestContext::with_timeout(Duration::from_secs(5));

    client.health(&ctx).await.unwrap();
    let err = client
        .tx(&ctx, &TxHash::of(b"never=sent"), false)
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{:?}", err);
}

#[tokio::test]
async fn test_http_light_node_refuses_queries() {
    let testnet = Testnet::start(fast_blocks(), topology());
    let addr = testnet.serve("light01", "127.0.0.1:0").await.unwrap();
    let client = HttpNodeClient::connect(&addr.to_string()).unwrap();
    let ctx = RequestContext::with_timeout(Duration::from_secs(5));

    assert!(client.abci_query(&ctx, "", b"anything").await.is_err());

    // The harness never asks, so the run still succeeds
    let node = NodeDescriptor::new("light01", NodeMode::Light);
    let report = AppTxTest::new(fast_polling()).run(&ctx, &node, &client).await;
    assert!(matches!(report.outcome, Outcome::Skipped { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_halted_chain_times_out_after_commit_window() {
    let testnet = Testnet::start(fast_blocks(), topology());
    testnet.pause();

    let node = NodeDescriptor::new("validator01", NodeMode::Validator);
    let client = testnet.node("validator01").unwrap();
    let start = tokio::time::Instant::now();

    let report = AppTxTest::new(HarnessConfig::default())
        .run(&RequestContext::background(), &node, &client)
        .await;

    assert_eq!(report.final_state(), RunState::TimedOut);
    assert!(start.elapsed() >= Duration::from_secs(30));
    match report.outcome {
        Outcome::Failed(HarnessError::CommitTimeout { waited, .. }) => {
            assert_eq!(waited, Duration::from_secs(30));
        }
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_repeated_runs_never_collide() {
    let testnet = Testnet::start(fast_blocks(), topology());
    let node = NodeDescriptor::new("validator01", NodeMode::Validator);
    let client = testnet.node("validator01").unwrap();
    let test = AppTxTest::new(fast_polling());

    let mut hashes = Vec::new();
    for _ in 0..3 {
        let report = test.run(&RequestContext::background(), &node, &client).await;
        assert!(report.passed(), "{:?}", report.outcome);
        hashes.push(report.hash.unwrap());
    }

    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), 3);
}
