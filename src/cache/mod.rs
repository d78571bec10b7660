//! Key-value store seam for sessions and per-tenant cached state.
//!
//! Handlers and services depend on the [`KeyValueStore`] trait; production
//! wiring uses [`RedisStore`], tests use [`MemoryStore`]. Consistency is
//! Redis semantics: last write wins, TTL expiry, whole-prefix invalidation.

pub mod memory;
pub mod redis;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use redis::{redis_store, RedisStore};
pub use session::{SessionState, SessionStore};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Async string key-value store with TTL and prefix invalidation
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set a value; `ttl = None` stores without expiry
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Returns true when the key existed
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Delete every key starting with `prefix`, returning the count removed
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;
}

/// The process-wide store, or `None` when Redis is unreachable. Session and
/// cache writes are best-effort: auth keeps working without Redis, handlers
/// fall back to token claims and direct queries.
pub async fn try_store() -> Option<Arc<dyn KeyValueStore>> {
    match redis_store().await {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!("Key-value store unavailable: {}", e);
            None
        }
    }
}

/// Tenant-scoped view over a store: every key is namespaced under
/// `tenant:{id}:` so one tenant's cached state can never leak into
/// another's, and invalidation can drop the whole namespace.
#[derive(Clone)]
pub struct TenantCache {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl TenantCache {
    pub fn new(store: Arc<dyn KeyValueStore>, tenant_id: uuid::Uuid) -> Self {
        Self {
            store,
            prefix: format!("tenant:{}:", tenant_id),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.store.get(&self.key(key)).await
    }

    pub async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.store.set(&self.key(key), value, ttl).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        self.store.delete(&self.key(key)).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(&self.key(key)).await
    }

    /// Drop every cached value for this tenant
    pub async fn invalidate_all(&self) -> Result<u64, CacheError> {
        self.store.delete_prefix(&self.prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn tenant_cache_namespaces_keys() {
        let store = Arc::new(MemoryStore::new());
        let a = TenantCache::new(store.clone(), Uuid::new_v4());
        let b = TenantCache::new(store.clone(), Uuid::new_v4());

        a.set("accounts", "[1]", None).await.unwrap();
        b.set("accounts", "[2]", None).await.unwrap();

        assert_eq!(a.get("accounts").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(b.get("accounts").await.unwrap().as_deref(), Some("[2]"));
    }

    #[tokio::test]
    async fn invalidate_all_only_clears_own_tenant() {
        let store = Arc::new(MemoryStore::new());
        let a = TenantCache::new(store.clone(), Uuid::new_v4());
        let b = TenantCache::new(store.clone(), Uuid::new_v4());

        a.set("x", "1", None).await.unwrap();
        a.set("y", "2", None).await.unwrap();
        b.set("x", "3", None).await.unwrap();

        assert_eq!(a.invalidate_all().await.unwrap(), 2);
        assert!(a.get("x").await.unwrap().is_none());
        assert_eq!(b.get("x").await.unwrap().as_deref(), Some("3"));
    }
}
