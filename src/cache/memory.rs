use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use super::{Cache, CacheError, record_lookup};

/// In-process cache bounded in entries, with a shared expiration.
///
/// A zero `ttl` keeps entries until they are deleted or evicted for room.
#[derive(Clone)]
pub struct MemoryCache {
    entries: MokaCache<String, String>,
}

impl MemoryCache {
    /// Create a new [`MemoryCache`] holding at most `capacity` entries.
    pub fn new(ttl: Duration, capacity: u64) -> Self {
        let mut builder = MokaCache::builder().max_capacity(capacity);
        if !ttl.is_zero() {
            builder = builder.time_to_live(ttl);
        }

        Self {
            entries: builder.build(),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self.entries.get(key).await;

        record_lookup("memory", value.is_some());
        tracing::trace!(%key, hit = value.is_some(), "memory cache lookup");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        self.entries.insert(key.to_owned(), value).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}
