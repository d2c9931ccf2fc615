use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Pool, Runtime};

use super::{Cache, CacheError, record_lookup};

/// Redis-backed cache shared between instances.
#[derive(Clone)]
pub struct RedisCache {
    pool: Pool,
    ttl: Duration,
}

impl RedisCache {
    /// Create a new [`RedisCache`] pool.
    ///
    /// Connections are opened lazily, on first command.
    pub fn new(url: &str, ttl: Duration) -> Result<Self, CacheError> {
        let pool = Config::from_url(url).create_pool(Some(Runtime::Tokio1))?;

        tracing::info!(ttl_secs = ttl.as_secs(), "redis cache pool created");

        Ok(Self { pool, ttl })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(key).await?;

        record_lookup("redis", value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;

        if self.ttl.is_zero() {
            conn.set::<_, _, ()>(key, value).await?;
        } else {
            conn.set_ex::<_, _, ()>(key, value, self.ttl.as_secs()).await?;
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}
