//! Persistent key/value store seam
//!
//! The host application owns persistence; the session only needs string
//! get/set by key. Everything the session persists goes through the three
//! keys defined here.

mod records;

pub use records::{decode_history, decode_last_query, encode_history, LastQueryRecord};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Storage key for the locale preference (raw locale tag)
pub const KEY_LOCALE: &str = "locale";
/// Storage key for the last executed query (serialized [`LastQueryRecord`])
pub const KEY_LAST_QUERY: &str = "last-query";
/// Storage key for the search history (serialized string array)
pub const KEY_HISTORY: &str = "history";

/// Error from a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Async string key/value store supplied by the host
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value; `None` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-memory store, used in tests and as a default for hosts without
/// persistence
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        tokio_test::block_on(async {
            assert_eq!(store.get(KEY_LOCALE).await.unwrap(), None);
            store.set(KEY_LOCALE, "de-DE".to_string()).await.unwrap();
            assert_eq!(
                store.get(KEY_LOCALE).await.unwrap(),
                Some("de-DE".to_string())
            );
        });
    }
}
