//! RPC Methods - JSON-RPC method handlers
//!
//! Implements the CometBFT-compatible subset the harness relies on.

use rpc_client::wire::{
    AbciQueryParams, AbciQueryResult, BroadcastTxParams, BroadcastTxResult, TxParams, TxResult,
};
use rpc_client::{NodeClient, RequestContext, RpcError};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Handle broadcast_tx_sync RPC method
pub async fn handle_broadcast_tx_sync<C: NodeClient + ?Sized>(
    node: &C,
    params: BroadcastTxParams,
) -> Result<BroadcastTxResult, RpcError> {
    let tx = params.decode()?;
    let res = node
        .broadcast_tx_sync(&RequestContext::background(), &tx)
        .await?;
    Ok(BroadcastTxResult::from(&res))
}

/// Handle tx RPC method
pub async fn handle_tx<C: NodeClient + ?Sized>(
    node: &C,
    params: TxParams,
) -> Result<TxResult, RpcError> {
    let hash = params.decode()?;
    let res = node
        .tx(&RequestContext::background(), &hash, params.prove)
        .await?;
    Ok(TxResult::from(&res))
}

/// Handle abci_query RPC method
pub async fn handle_abci_query<C: NodeClient + ?Sized>(
    node: &C,
    params: AbciQueryParams,
) -> Result<AbciQueryResult, RpcError> {
    let data = params.decode()?;
    let res = node
        .abci_query(&RequestContext::background(), &params.path, &data)
        .await?;
    Ok(AbciQueryResult::from(&res))
}

/// Handle health RPC method
pub async fn handle_health<C: NodeClient + ?Sized>(node: &C) -> Result<Value, RpcError> {
    node.health(&RequestContext::background()).await?;
    Ok(json!({}))
}

/// Dispatch to appropriate method handler
pub async fn dispatch_method<C: NodeClient + ?Sized>(
    node: &C,
    method: &str,
    params: Value,
) -> Result<Value, RpcError> {
    tracing::debug!("RPC method called: {}", method);
    match method {
        "broadcast_tx_sync" => {
            let res = handle_broadcast_tx_sync(node, parse_params(params)?).await?;
            to_value(res)
        }
        "tx" => {
            let res = handle_tx(node, parse_params(params)?).await?;
            to_value(res)
        }
        "abci_query" => {
            let res = handle_abci_query(node, parse_params(params)?).await?;
            to_value(res)
        }
        "health" => handle_health(node).await,
        _ => Err(RpcError::Unsupported(format!("method {}", method))),
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params).map_err(|e| RpcError::Decode(format!("invalid params: {}", e)))
}

fn to_value<T: serde::Serialize>(res: T) -> Result<Value, RpcError> {
    serde_json::to_value(res).map_err(|e| RpcError::Decode(e.to_string()))
}
