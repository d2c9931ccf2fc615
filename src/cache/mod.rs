//! Read-through cache adapters.
//!
//! Caches hold serialized values and own no business semantics: callers
//! decide what to memoize and when to invalidate it.
mod memory;
mod redis;

pub use memory::MemoryCache;
pub use redis::RedisCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config;

/// Errors raised by a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis command failed: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),
    #[error("cannot get redis connection: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
    #[error("cannot create redis pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),
    #[error("cached value is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Port for key-value caching.
///
/// Best effort: no ordering or atomicity relative to the record store.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns `None` on miss.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    /// Store `value` under `key` using the backend expiration.
    async fn set(&self, key: &str, value: String) -> Result<(), CacheError>;
    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Build the configured cache backend.
///
/// Redis is used when an URL is set, otherwise entries stay in memory,
/// bounded to `capacity`.
pub fn from_config(config: &config::Cache) -> Result<Arc<dyn Cache>, CacheError> {
    let ttl = Duration::from_secs(config.ttl);

    match &config.redis {
        Some(url) => Ok(Arc::new(RedisCache::new(url, ttl)?)),
        None => Ok(Arc::new(MemoryCache::new(ttl, config.capacity))),
    }
}

fn record_lookup(backend: &'static str, hit: bool) {
    if hit {
        metrics::counter!("cache_hits_total", "backend" => backend).increment(1);
    } else {
        metrics::counter!("cache_misses_total", "backend" => backend).increment(1);
    }
}
