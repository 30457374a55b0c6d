//! Transactions and content hashes

use crate::TX_HASH_LEN;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// SHA-256 digest of a transaction's raw bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TxHash([u8; TX_HASH_LEN]);

impl TxHash {
    /// Hash raw transaction bytes
    pub fn of(raw: &[u8]) -> Self {
        let mut out = [0u8; TX_HASH_LEN];
        out.copy_from_slice(&Sha256::digest(raw));
        Self(out)
    }

    /// Build from a slice, which must be exactly 32 bytes
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, TxHashParseError> {
        let arr: [u8; TX_HASH_LEN] = bytes
            .try_into()
            .map_err(|_| TxHashParseError::Length(bytes.len()))?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; TX_HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl FromStr for TxHash {
    type Err = TxHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| TxHashParseError::Hex(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

impl From<TxHash> for String {
    fn from(hash: TxHash) -> Self {
        hash.to_string()
    }
}

impl TryFrom<String> for TxHash {
    type Error = TxHashParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TxHashParseError {
    #[error("invalid hex: {0}")]
    Hex(String),
    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

/// A key/value transaction in the kvstore `key=value` encoding
///
/// Immutable once built: `raw` and `hash` are derived at construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Transaction {
    key: String,
    value: String,
    raw: Vec<u8>,
    hash: TxHash,
}

impl Transaction {
    /// Build the canonical `"<key>=<value>"` transaction
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        let raw = format!("{}={}", key, value).into_bytes();
        let hash = TxHash::of(&raw);
        Self {
            key,
            value,
            raw,
            hash,
        }
    }

    /// Parse raw bytes the way the kvstore application does.
    ///
    /// A raw payload without `=` stores itself as both key and value.
    /// Returns `None` for non UTF-8 payloads.
    pub fn from_raw(raw: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(raw).ok()?;
        let (key, value) = text.split_once('=').unwrap_or((text, text));
        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
            raw: raw.to_vec(),
            hash: TxHash::of(raw),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("hash", &self.hash)
            .finish()
    }
}
