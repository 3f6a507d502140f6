//! Key-value store backends for the visitor ledger.
//!
//! - [`InMemoryStore`]: process-local, used for development and tests.
//! - [`RedisStore`]: shared state across gateway instances.
//! - [`CachedStore`]: a write-through Moka cache layered over either.
//!
//! # Example
//!
//! ```rust
//! use footfall_core::KvStore;
//! use footfall_store::{CachedStore, InMemoryStore};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CachedStore::new(InMemoryStore::new(), Duration::from_secs(60));
//! store.set("last-visitor", "Paris, France".into()).await?;
//! assert!(store.get("last-visitor").await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod cached;
pub mod memory;
pub mod redis;

pub use cached::{CacheConfig, CachedStore};
pub use memory::InMemoryStore;
pub use redis::RedisStore;
