use async_trait::async_trait;
use dashmap::DashMap;
use footfall_core::{KvStore, Result};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory implementation of [`KvStore`] using DashMap.
///
/// Documents are cloned in and out, so callers never observe each other's
/// in-flight mutations. The store also counts writes, which lets tests
/// assert that an operation did not persist anything.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    storage: DashMap<String, Value>,
    writes: AtomicU64,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls since creation.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.storage.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.storage.insert(key.to_owned(), value);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
