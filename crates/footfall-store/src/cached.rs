use async_trait::async_trait;
use footfall_core::{KvStore, Result};
use moka::future::Cache;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

/// A [`KvStore`] decorator that keeps recently read documents in memory.
///
/// - **Get**: served from the Moka cache when present; on a miss, the inner
///   store is read once (concurrent misses for the same key coalesce) and
///   the answer, including "absent", is cached.
/// - **Set**: written to the inner store first, then the cached copy is
///   replaced. A failed write leaves the cache untouched.
///
/// Writes made by other processes become visible once the TTL lapses, so
/// read-modify-write callers must use the inner store directly.
#[derive(Debug, Clone)]
pub struct CachedStore<S> {
    inner: S,
    cache: Cache<String, Option<Value>>,
}

/// Configuration for the in-process document cache.
#[derive(Debug, Clone, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of documents the cache can hold.
    #[builder(default = 1_024)]
    pub max_capacity: u64,
    /// Time-to-live for cached documents.
    #[builder(default = Duration::from_secs(60))]
    pub ttl: Duration,
}

impl<S: KvStore> CachedStore<S> {
    /// Wraps `inner` with a cache whose entries live for `ttl`.
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self::with_config(inner, CacheConfig::builder().ttl(ttl).build())
    }

    pub fn with_config(inner: S, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();
        Self { inner, cache }
    }

    /// Returns a reference to the inner store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drops the cached copy of `key` so the next read goes to the inner store.
    pub async fn invalidate(&self, key: &str) {
        trace!(key, "Invalidating cached document");
        self.cache.invalidate(key).await;
    }
}

#[async_trait]
impl<S: KvStore> KvStore for CachedStore<S> {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        if let Some(cached) = self.cache.get(key).await {
            debug!(key, "Cache hit");
            return Ok(cached);
        }

        trace!(key, "Cache miss, reading inner store");
        self.cache
            .try_get_with(key.to_owned(), self.inner.get(key))
            .await
            .map_err(|e| e.as_ref().clone())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.inner.set(key, value.clone()).await?;
        self.cache.insert(key.to_owned(), Some(value)).await;
        debug!(key, "Wrote through and refreshed cached document");
        Ok(())
    }
}
