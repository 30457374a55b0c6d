//! JSON-RPC wire types
//!
//! Field encodings follow the CometBFT RPC: raw byte fields are base64,
//! hash and query-data fields are hex, 64-bit integers are decimal strings.

use crate::RpcError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use e2e_types::{BroadcastResponse, QueryResult, TxHash, TxResponse};
use serde::{Deserialize, Serialize};

pub const BROADCAST_TX_SYNC: &str = "broadcast_tx_sync";
pub const TX: &str = "tx";
pub const ABCI_QUERY: &str = "abci_query";
pub const HEALTH: &str = "health";

// ============ Params ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastTxParams {
    /// Base64 encoded transaction
    pub tx: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxParams {
    /// Base64 encoded hash
    pub hash: String,
    #[serde(default)]
    pub prove: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbciQueryParams {
    #[serde(default)]
    pub path: String,
    /// Hex encoded query data
    #[serde(default)]
    pub data: String,
    #[serde(default, with = "string_u64")]
    pub height: u64,
    #[serde(default)]
    pub prove: bool,
}

// ============ Results ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastTxResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub codespace: String,
    /// Upper-case hex
    pub hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecTxResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResult {
    pub hash: String,
    #[serde(with = "string_u64")]
    pub height: u64,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub tx_result: ExecTxResult,
    /// Base64 encoded transaction
    pub tx: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbciQueryResponse {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub info: String,
    #[serde(default, with = "string_u64")]
    pub index: u64,
    /// Base64, null when empty
    #[serde(default)]
    pub key: Option<String>,
    /// Base64, null when empty
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, with = "string_u64")]
    pub height: u64,
    #[serde(default)]
    pub codespace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbciQueryResult {
    pub response: AbciQueryResponse,
}

// ============ Conversions ============

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, RpcError> {
    BASE64
        .decode(value)
        .map_err(|e| RpcError::Decode(format!("{}: invalid base64: {}", field, e)))
}

fn decode_hash(value: &str) -> Result<TxHash, RpcError> {
    value
        .parse()
        .map_err(|e| RpcError::Decode(format!("hash: {}", e)))
}

fn encode_optional(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(BASE64.encode(bytes))
    }
}

impl BroadcastTxParams {
    pub fn new(tx: &[u8]) -> Self {
        Self {
            tx: BASE64.encode(tx),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, RpcError> {
        decode_base64("tx", &self.tx)
    }
}

impl TxParams {
    pub fn new(hash: &TxHash, prove: bool) -> Self {
        Self {
            hash: BASE64.encode(hash.as_bytes()),
            prove,
        }
    }

    pub fn decode(&self) -> Result<TxHash, RpcError> {
        let bytes = decode_base64("hash", &self.hash)?;
        TxHash::try_from_slice(&bytes).map_err(|e| RpcError::Decode(format!("hash: {}", e)))
    }
}

impl AbciQueryParams {
    pub fn new(path: &str, data: &[u8]) -> Self {
        Self {
            path: path.to_string(),
            data: hex::encode_upper(data),
            height: 0,
            prove: false,
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, RpcError> {
        hex::decode(&self.data).map_err(|e| RpcError::Decode(format!("data: invalid hex: {}", e)))
    }
}

impl BroadcastTxResult {
    pub fn into_domain(self) -> Result<BroadcastResponse, RpcError> {
        Ok(BroadcastResponse {
            hash: decode_hash(&self.hash)?,
            code: self.code,
            log: self.log,
        })
    }
}

impl From<&BroadcastResponse> for BroadcastTxResult {
    fn from(res: &BroadcastResponse) -> Self {
        Self {
            code: res.code,
            data: String::new(),
            log: res.log.clone(),
            codespace: String::new(),
            hash: res.hash.to_string(),
        }
    }
}

impl TxResult {
    pub fn into_domain(self) -> Result<TxResponse, RpcError> {
        Ok(TxResponse {
            hash: decode_hash(&self.hash)?,
            height: self.height,
            index: self.index,
            tx: decode_base64("tx", &self.tx)?,
        })
    }
}

impl From<&TxResponse> for TxResult {
    fn from(res: &TxResponse) -> Self {
        Self {
            hash: res.hash.to_string(),
            height: res.height,
            index: res.index,
            tx_result: ExecTxResult::default(),
            tx: BASE64.encode(&res.tx),
        }
    }
}

impl AbciQueryResult {
    pub fn into_domain(self) -> Result<QueryResult, RpcError> {
        let res = self.response;
        let key = match res.key {
            Some(k) => decode_base64("key", &k)?,
            None => Vec::new(),
        };
        let value = match res.value {
            Some(v) => decode_base64("value", &v)?,
            None => Vec::new(),
        };
        Ok(QueryResult {
            key,
            value,
            code: res.code,
            log: res.log,
            height: res.height,
        })
    }
}

impl From<&QueryResult> for AbciQueryResult {
    fn from(res: &QueryResult) -> Self {
        Self {
            response: AbciQueryResponse {
                code: res.code,
                log: res.log.clone(),
                key: encode_optional(&res.key),
                value: encode_optional(&res.value),
                height: res.height,
                ..Default::default()
            },
        }
    }
}

/// Decimal-string encoding for 64-bit integers, accepting bare numbers too
pub mod string_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
            StringOrNumber::Number(n) => Ok(n),
        }
    }
}
