//! In-memory application state using DashMap for concurrent access

use dashmap::DashMap;
use e2e_types::QueryResult;
use std::sync::Arc;

/// Thread-safe kvstore application state
///
/// Reads are served concurrently by node views while the block
/// producer applies committed transactions.
#[derive(Clone, Default)]
pub struct KvStore {
    /// Committed key/value pairs
    entries: Arc<DashMap<Vec<u8>, Vec<u8>>>,
}

impl KvStore {
    /// Apply a committed transaction.
    ///
    /// `key=value` sets key to value; any other payload is stored under itself.
    pub fn apply_tx(&self, tx: &[u8]) {
        let (key, value) = match tx.iter().position(|b| *b == b'=') {
            Some(pos) => (&tx[..pos], &tx[pos + 1..]),
            None => (tx, tx),
        };
        self.entries.insert(key.to_vec(), value.to_vec());
    }

    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    /// Answer an application query; the key is the query data
    pub fn query(&self, data: &[u8], height: u64) -> QueryResult {
        match self.get(data) {
            Some(value) => QueryResult {
                key: data.to_vec(),
                value,
                code: 0,
                log: "exists".to_string(),
                height,
            },
            None => QueryResult {
                key: data.to_vec(),
                value: Vec::new(),
                code: 0,
                log: "does not exist".to_string(),
                height,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_key_value() {
        let store = KvStore::default();
        store.apply_tx(b"name=satoshi");
        assert_eq!(store.get(b"name").unwrap(), b"satoshi");

        store.apply_tx(b"name=nakamoto");
        assert_eq!(store.get(b"name").unwrap(), b"nakamoto");
    }

    #[test]
    fn test_apply_without_separator() {
        let store = KvStore::default();
        store.apply_tx(b"plain");
        assert_eq!(store.get(b"plain").unwrap(), b"plain");
    }

    #[test]
    fn test_query() {
        let store = KvStore::default();
        store.apply_tx(b"k=a=b");

        let hit = store.query(b"k", 2);
        assert_eq!(hit.key, b"k");
        assert_eq!(hit.value, b"a=b");
        assert_eq!(hit.log, "exists");

        let miss = store.query(b"nope", 2);
        assert!(miss.value.is_empty());
        assert_eq!(miss.log, "does not exist");
    }
}
