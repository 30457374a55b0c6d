//! HTTP JSON-RPC Server
//!
//! Exposes a node's RPC methods on a single POST endpoint.

use crate::methods::dispatch_method;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use rpc_client::{NodeClient, RpcError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;

/// JSON-RPC request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl From<&RpcError> for JsonRpcError {
    fn from(e: &RpcError) -> Self {
        // CometBFT reports lookups and app errors as internal errors with detail in data
        match e {
            RpcError::Server { code, message } => Self {
                code: *code,
                message: "Internal error".to_string(),
                data: Some(message.clone()),
            },
            RpcError::NotFound(detail) => Self {
                code: e.code(),
                message: "Internal error".to_string(),
                data: Some(detail.clone()),
            },
            other => Self {
                code: other.code(),
                message: other.to_string(),
                data: None,
            },
        }
    }
}

/// HTTP RPC Server
pub struct HttpRpcServer {
    node: Arc<dyn NodeClient>,
}

impl HttpRpcServer {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Self { node }
    }

    /// Create the Axum router
    pub fn router(self) -> Router {
        Router::new()
            .route("/", post(handle_rpc))
            .with_state(self.node)
    }

    /// Bind and serve in the background, returning the bound address
    pub async fn spawn(self, addr: &str) -> anyhow::Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("HTTP RPC server listening on {}", local_addr);

        let router = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("HTTP RPC server on {} failed: {}", local_addr, e);
            }
        });
        Ok(local_addr)
    }
}

/// Handle JSON-RPC request
async fn handle_rpc(
    State(node): State<Arc<dyn NodeClient>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let result = dispatch_method(&*node, &request.method, request.params).await;

    let response = match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(e) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(JsonRpcError::from(&e)),
        },
    };

    (StatusCode::OK, Json(response))
}
