//! JSON-RPC over HTTP node client

use crate::wire::{
    AbciQueryParams, AbciQueryResult, BroadcastTxParams, BroadcastTxResult, TxParams, TxResult,
    ABCI_QUERY, BROADCAST_TX_SYNC, HEALTH, TX,
};
use crate::error::INTERNAL_ERROR;
use crate::{NodeClient, RequestContext, RpcError};
use async_trait::async_trait;
use e2e_types::{BroadcastResponse, QueryResult, TxHash, TxResponse};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;

/// HTTP client configuration
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Node RPC endpoint, `http://` is assumed when no scheme is given
    pub url: String,
    /// Transport-level timeout applied to every request
    pub request_timeout: Duration,
    /// Maximum accepted response body size in bytes
    pub max_response_size: u32,
}

impl HttpClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:26657".to_string(),
            request_timeout: Duration::from_secs(10),
            max_response_size: 10 * 1024 * 1024,
        }
    }
}

/// Node client speaking the CometBFT JSON-RPC dialect
pub struct HttpNodeClient {
    client: HttpClient,
    url: String,
}

impl HttpNodeClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self, RpcError> {
        let url = normalize_url(&config.url);
        let client = HttpClientBuilder::default()
            .request_timeout(config.request_timeout)
            .max_response_size(config.max_response_size)
            .build(&url)
            .map_err(|e| RpcError::Transport(format!("cannot build client for {}: {}", url, e)))?;

        tracing::debug!("HTTP RPC client created for {}", url);
        Ok(Self { client, url })
    }

    pub fn connect(url: &str) -> Result<Self, RpcError> {
        Self::new(&HttpClientConfig::new(url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<P, R>(
        &self,
        ctx: &RequestContext,
        method: &str,
        params: &P,
    ) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = object_params(params)?;
        tracing::trace!("RPC {} -> {}", method, self.url);
        ctx.bound(self.client.request::<R, _>(method, params))
            .await?
            .map_err(map_client_error)
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn broadcast_tx_sync(
        &self,
        ctx: &RequestContext,
        tx: &[u8],
    ) -> Result<BroadcastResponse, RpcError> {
        let res: BroadcastTxResult = self
            .call(ctx, BROADCAST_TX_SYNC, &BroadcastTxParams::new(tx))
            .await?;
        res.into_domain()
    }

    async fn tx(
        &self,
        ctx: &RequestContext,
        hash: &TxHash,
        prove: bool,
    ) -> Result<TxResponse, RpcError> {
        let res: TxResult = self.call(ctx, TX, &TxParams::new(hash, prove)).await?;
        res.into_domain()
    }

    async fn abci_query(
        &self,
        ctx: &RequestContext,
        path: &str,
        data: &[u8],
    ) -> Result<QueryResult, RpcError> {
        let res: AbciQueryResult = self
            .call(ctx, ABCI_QUERY, &AbciQueryParams::new(path, data))
            .await?;
        res.into_domain()
    }

    async fn health(&self, ctx: &RequestContext) -> Result<(), RpcError> {
        let _: Value = self.call(ctx, HEALTH, &serde_json::Map::new()).await?;
        Ok(())
    }
}

fn normalize_url(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

/// Turn a params struct into named JSON-RPC params
fn object_params<P: Serialize>(params: &P) -> Result<ObjectParams, RpcError> {
    let value = serde_json::to_value(params).map_err(|e| RpcError::Decode(e.to_string()))?;
    let Value::Object(map) = value else {
        return Err(RpcError::Decode("params must serialize to an object".to_string()));
    };

    let mut out = ObjectParams::new();
    for (name, value) in map {
        out.insert(&name, value)
            .map_err(|e| RpcError::Decode(e.to_string()))?;
    }
    Ok(out)
}

fn map_client_error(err: ClientError) -> RpcError {
    match err {
        ClientError::Call(obj) => {
            let data = obj.data().map(|d| d.get().to_string()).unwrap_or_default();
            let message = if data.is_empty() {
                obj.message().to_string()
            } else {
                format!("{}: {}", obj.message(), data)
            };
            // Lookups that miss come back as internal errors, unlike "Method not found"
            if obj.code() == INTERNAL_ERROR && message.contains("not found") {
                RpcError::NotFound(message)
            } else {
                RpcError::Server {
                    code: obj.code(),
                    message,
                }
            }
        }
        ClientError::RequestTimeout => RpcError::DeadlineExceeded,
        ClientError::ParseError(e) => RpcError::Decode(e.to_string()),
        other => RpcError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::types::ErrorObjectOwned;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("127.0.0.1:26657"), "http://127.0.0.1:26657");
        assert_eq!(normalize_url("https://node:443"), "https://node:443");
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let hash = TxHash::of(b"k=v");
        let err = ErrorObjectOwned::owned(
            -32603,
            "Internal error",
            Some(format!("tx ({}) not found", hash)),
        );
        let mapped = map_client_error(ClientError::Call(err));
        assert!(mapped.is_not_found(), "{:?}", mapped);
    }

    #[test]
    fn test_other_call_errors_keep_code() {
        let err = ErrorObjectOwned::owned(-32602, "Invalid params", None::<()>);
        assert_eq!(
            map_client_error(ClientError::Call(err)),
            RpcError::Server {
                code: -32602,
                message: "Invalid params".to_string()
            }
        );
        assert_eq!(
            map_client_error(ClientError::RequestTimeout),
            RpcError::DeadlineExceeded
        );
    }

    #[test]
    fn test_unknown_method_is_not_a_missing_tx() {
        let err = ErrorObjectOwned::owned(-32601, "Method not found", None::<()>);
        let mapped = map_client_error(ClientError::Call(err));
        assert!(!mapped.is_not_found());
        assert_eq!(mapped.code(), -32601);
    }

    #[test]
    fn test_object_params() {
        assert!(object_params(&AbciQueryParams::new("", b"k")).is_ok());
        assert!(object_params(&42u32).is_err());
    }
}
