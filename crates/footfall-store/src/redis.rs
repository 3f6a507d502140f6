use async_trait::async_trait;
use footfall_core::{KvStore, Result, StorageError};
use redis::AsyncCommands;
use serde_json::Value;
use tracing::{debug, trace, warn};

/// A Redis-based implementation of [`KvStore`].
///
/// Documents are stored as JSON strings under a configurable key prefix.
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("timed out") {
        StorageError::Timeout(message)
    } else if lowered.contains("connection refused") {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

impl RedisStore {
    pub const DEFAULT_PREFIX: &'static str = "ff:";

    /// Creates a new Redis store using the default `ff:` key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, Self::DEFAULT_PREFIX)
    }

    /// Creates a new Redis store with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for keys (e.g., "site:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a client for `url` and establishes a multiplexed connection.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StorageError::Unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::with_prefix(conn, key_prefix))
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let storage_key = self.storage_key(key);
        trace!(key, "Fetching document from Redis");

        let mut conn = self.conn.clone();
        let raw = conn
            .get::<_, Option<String>>(&storage_key)
            .await
            .map_err(|e| {
                warn!(key, error = %e, "Redis error on get");
                map_redis_error("failed to fetch value from Redis", e)
            })?;

        let Some(raw) = raw else {
            trace!(key, "Key not present in Redis");
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => {
                debug!(key, "Loaded document from Redis");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(key, error = %e, "Stored value is not valid JSON");
                Err(StorageError::InvalidData(format!(
                    "invalid stored value for key '{storage_key}': {e}"
                )))
            }
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let storage_key = self.storage_key(key);
        trace!(key, "Storing document in Redis");

        let json = serde_json::to_string(&value).map_err(|e| {
            StorageError::Serialization(format!("failed to serialize value: {e}"))
        })?;

        let mut conn = self.conn.clone();
        match conn.set::<_, _, ()>(&storage_key, json).await {
            Ok(()) => {
                debug!(key, "Stored document in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to store document in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}
