//! Synchronous submission

use crate::HarnessError;
use e2e_types::{CommitResult, Transaction};
use rpc_client::{NodeClient, RequestContext};

/// Broadcast `tx` and check the node accepted it under the expected hash.
///
/// A non-zero code or a hash other than the locally computed one fails the run.
pub async fn submit<C: NodeClient + ?Sized>(
    client: &C,
    ctx: &RequestContext,
    tx: &Transaction,
) -> Result<CommitResult, HarnessError> {
    let res = client
        .broadcast_tx_sync(ctx, tx.raw())
        .await
        .map_err(|e| HarnessError::transport("broadcast_tx_sync", e))?;

    let result = CommitResult {
        hash: tx.hash(),
        acceptance_code: res.code,
        returned_hash: res.hash,
    };

    if !result.is_accepted() {
        return Err(HarnessError::Rejected {
            code: res.code,
            log: res.log,
        });
    }

    if !result.hashes_match() {
        return Err(HarnessError::HashMismatch {
            expected: result.hash,
            actual: result.returned_hash,
        });
    }

    tracing::info!("Submitted tx {}", result.hash);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedClient;
    use e2e_types::{BroadcastResponse, TxHash};
    use rpc_client::RpcError;

    fn tx() -> Transaction {
        Transaction::new("testapp-tx-node0", "00ff")
    }

    #[tokio::test]
    async fn test_accepted() {
        let client = ScriptedClient::new();
        let result = submit(&client, &RequestContext::background(), &tx())
            .await
            .unwrap();
        assert!(result.is_accepted());
        assert_eq!(result.returned_hash, tx().hash());
    }

    #[tokio::test]
    async fn test_rejected_code_is_fatal() {
        let client = ScriptedClient::new().broadcast_result(Ok(BroadcastResponse {
            hash: tx().hash(),
            code: 2,
            log: "invalid tx format".to_string(),
        }));
        let err = submit(&client, &RequestContext::background(), &tx())
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::Rejected { code: 2, .. }));
    }

    #[tokio::test]
    async fn test_hash_mismatch_is_fatal() {
        let other = TxHash::of(b"something else");
        let client = ScriptedClient::new().broadcast_result(Ok(BroadcastResponse {
            hash: other,
            code: 0,
            log: String::new(),
        }));
        let err = submit(&client, &RequestContext::background(), &tx())
            .await
            .unwrap_err();
        match err {
            HarnessError::HashMismatch { expected, actual } => {
                assert_eq!(expected, tx().hash());
                assert_eq!(actual, other);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let client = ScriptedClient::new()
            .broadcast_result(Err(RpcError::Transport("connection refused".to_string())));
        let err = submit(&client, &RequestContext::background(), &tx())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
