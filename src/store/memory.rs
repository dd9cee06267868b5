//! Implements the `KeyValue` trait with an in-memory map.
//!
//! Note: this is compiled even in the "production" version of this app so that the store can be
//! used without a database file, e.g. by library users and in tests.

use crate::store::KeyValue;
use crate::Result;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A `KeyValue` medium that keeps everything in memory. Clones share the same data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    read_only: Arc<AtomicBool>,
    rejected: Arc<Mutex<HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While read-only, every `set_item` fails. This simulates a medium that rejects writes.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// From now on, every `set_item` for `key` fails while other keys can still be written.
    pub async fn reject_writes_to(&self, key: &str) {
        self.rejected.lock().await.insert(key.to_string());
    }
}

#[async_trait::async_trait]
impl KeyValue for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        anyhow::ensure!(
            !self.read_only.load(Ordering::SeqCst),
            "The memory store is read-only, unable to write '{key}'"
        );
        anyhow::ensure!(
            !self.rejected.lock().await.contains(key),
            "The memory store rejects writes to '{key}'"
        );
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_set() {
        let store = MemoryStore::new();
        store.set_item("a", "1").await.unwrap();
        assert_eq!(store.get_item("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get_item("b").await.unwrap(), None);
        store.set_item("b", "2").await.unwrap();
        assert_eq!(store.get_item("b").await.unwrap().as_deref(), Some("2"));
        store.set_read_only(true);
        assert!(store.set_item("b", "3").await.is_err());
        assert_eq!(store.get_item("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_rejected_key() {
        let store = MemoryStore::new();
        store.reject_writes_to("b").await;
        assert!(store.set_item("a", "1").await.is_ok());
        assert!(store.set_item("b", "2").await.is_err());
        assert_eq!(store.get_item("b").await.unwrap(), None);
    }
}
