use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use redis::{aio::ConnectionManager, AsyncCommands};

use super::CacheStore;
use crate::errors::{Error, Result};

/// Redis-backed cache shared between processes.
///
/// Uses a `ConnectionManager` for automatic reconnection; each call works on a
/// cheap clone of the manager so no lock is held across the network round-trip.
#[derive(Clone)]
pub struct RedisCache {
    conn_manager: ConnectionManager,
    redis_url: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("redis_url", &self.redis_url)
            .field("conn_manager", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        if redis_url.trim().is_empty() {
            return Err(Error::Validation("Redis URL is empty".to_string()));
        }

        info!("Initializing Redis connection manager for {}", redis_url);
        let client = redis::Client::open(redis_url)?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            error!("Failed to create Redis ConnectionManager: {}", e);
            Error::Cache(format!("Failed to connect to Redis: {}", e))
        })?;

        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
        })
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if !ttl.is_zero() {
            // PX keeps sub-second TTLs
            let millis = ttl.as_millis().max(1);
            cmd.arg("PX").arg(u64::try_from(millis).unwrap_or(u64::MAX));
        }

        cmd.query_async::<_, ()>(&mut conn).await.map_err(|e| {
            warn!("Redis SET failed for key '{}': {}", key, e);
            Error::from(e)
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn_manager.clone();
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            error!("Redis GET failed for key '{}': {}", key, e);
            Error::from(e)
        })?;

        if value.is_none() {
            debug!("Redis cache miss for key '{}'", key);
        }
        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        conn.del::<_, i64>(key).await.map(|_| ()).map_err(|e| {
            error!("Redis DEL failed for key '{}': {}", key, e);
            Error::from(e)
        })
    }
}
