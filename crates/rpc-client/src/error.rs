//! RPC error types

/// JSON-RPC error codes
pub const INVALID_PARAMS: i32 = -32602;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("RPC error {code}: {message}")]
    Server { code: i32, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Deadline exceeded")]
    DeadlineExceeded,
    #[error("Invalid response: {0}")]
    Decode(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl RpcError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RpcError::NotFound(_))
    }

    /// Map to a JSON-RPC error code
    pub fn code(&self) -> i32 {
        match self {
            RpcError::Server { code, .. } => *code,
            RpcError::Decode(_) => INVALID_PARAMS,
            RpcError::Unsupported(_) => METHOD_NOT_FOUND,
            _ => INTERNAL_ERROR,
        }
    }
}
