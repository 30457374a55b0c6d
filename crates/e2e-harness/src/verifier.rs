//! State verification through the application query interface

use crate::HarnessError;
use e2e_types::{QueryResult, Transaction};
use rpc_client::{NodeClient, RequestContext};

/// Empty path selects the application's default query handler
pub const DEFAULT_QUERY_PATH: &str = "";

/// Query the transaction's key and require the echoed key and stored value to match
pub async fn verify_state<C: NodeClient + ?Sized>(
    client: &C,
    ctx: &RequestContext,
    tx: &Transaction,
) -> Result<QueryResult, HarnessError> {
    let res = client
        .abci_query(ctx, DEFAULT_QUERY_PATH, tx.key().as_bytes())
        .await
        .map_err(|e| HarnessError::transport("abci_query", e))?;

    check_field("key", tx.key(), &res.key)?;
    check_field("value", tx.value(), &res.value)?;

    tracing::info!("Verified {} at height {}", tx.key(), res.height);
    Ok(res)
}

fn check_field(field: &'static str, expected: &str, actual: &[u8]) -> Result<(), HarnessError> {
    if expected.as_bytes() == actual {
        return Ok(());
    }
    Err(HarnessError::StateMismatch {
        field,
        expected: expected.to_string(),
        actual: String::from_utf8_lossy(actual).into_owned(),
    })
}
