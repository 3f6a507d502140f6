use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A key-value store holding JSON documents.
///
/// The ledger reads and writes whole documents: one key for the visitor
/// list and one for the last-visitor label. Implementations can use Redis,
/// an in-memory map, or a cache layered over either.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// Get the document stored under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the document stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value).await
    }
}
