//! Redis-backed store. One multiplexed connection manager per process,
//! created lazily on first use.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use tokio::sync::OnceCell;

use super::{CacheError, KeyValueStore};
use crate::config;

static MANAGER: OnceCell<ConnectionManager> = OnceCell::const_new();

async fn connection_manager() -> Result<ConnectionManager, CacheError> {
    let manager = MANAGER
        .get_or_try_init(|| async {
            let cache = &config::config().cache;
            let cfg = ConnectionManagerConfig::new()
                .set_number_of_retries(cache.retries)
                .set_connection_timeout(Duration::from_millis(cache.connect_timeout_ms));

            let client = redis::Client::open(cache.redis_url.as_str())?;
            let manager = client.get_connection_manager_with_config(cfg).await?;
            tracing::info!("Connected Redis connection manager");
            Ok::<_, CacheError>(manager)
        })
        .await?;

    Ok(manager.clone())
}

/// Handle over the shared Redis connection manager
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

/// Get the process-wide Redis store
pub async fn redis_store() -> Result<RedisStore, CacheError> {
    Ok(RedisStore {
        conn: connection_manager().await?,
    })
}

/// Ping Redis; used by the health endpoint
pub async fn health_check() -> Result<(), CacheError> {
    let mut conn = connection_manager().await?;
    redis::cmd("PING").query_async::<()>(&mut conn).await?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix.replace('*', "\\*"));

        // SCAN, then delete in one batch; the key set per tenant is small
        let keys: Vec<String> = {
            let mut iter = conn.scan_match::<_, String>(&pattern).await?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if keys.is_empty() {
            return Ok(0);
        }

        let removed: u64 = conn.del(&keys).await?;
        Ok(removed)
    }
}
