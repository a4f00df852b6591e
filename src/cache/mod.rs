//! Cached-page store used by the UI layer.
//!
//! Mutations do not write here directly; they emit events, and the event
//! processor invalidates the logical page keys whose rendered views depend
//! on the changed aggregate. The backend is swappable; the in-memory
//! implementation is the default.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Logical page keys the UI renders from. These are the invalidation
/// targets named by events.
pub mod pages {
    pub const PRODUCTS: &str = "products";
    pub const STOREFRONT: &str = "storefront";
    pub const STOCK_DASHBOARD: &str = "stock-dashboard";
    pub const SALES: &str = "sales";
    pub const BUDGETS: &str = "budgets";
    pub const CLIENTS: &str = "clients";
    pub const SUPPLIERS: &str = "suppliers";
    pub const ENTERPRISE: &str = "enterprise";
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
}

#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}

/// Drops every cached rendering of the named pages. Failures are logged by
/// the caller; invalidation is best-effort and never blocks the mutation.
pub async fn invalidate_pages(
    cache: &dyn CacheBackend,
    page_keys: &[&str],
) -> Result<(), CacheError> {
    for key in page_keys {
        cache.delete(key).await?;
        debug!(page = %key, "cached page invalidated");
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() > expires_at,
            None => false,
        }
    }
}

/// In-memory cache with per-entry TTL.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let expired = {
            let store = self
                .store
                .read()
                .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
            match store.get(key) {
                Some(entry) if entry.is_expired() => true,
                Some(entry) => return Ok(Some(entry.value.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            let mut store = self
                .store
                .write()
                .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
            store.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut store = self
            .store
            .write()
            .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
        store.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut store = self
            .store
            .write()
            .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
        store.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let store = self
            .store
            .read()
            .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
        Ok(store.get(key).map_or(false, |e| !e.is_expired()))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut store = self
            .store
            .write()
            .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
        store.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete_round_trip() {
        let cache = InMemoryCache::new();
        cache.set("k", "v", None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(cache.exists("k").await.unwrap());

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entries_read_as_miss() {
        let cache = InMemoryCache::new();
        cache
            .set("k", "v", Some(Duration::from_millis(1)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalidate_pages_removes_named_keys_only() {
        let cache = InMemoryCache::new();
        cache.set(pages::SALES, "html", None).await.unwrap();
        cache.set(pages::PRODUCTS, "html", None).await.unwrap();
        cache.set(pages::BUDGETS, "html", None).await.unwrap();

        invalidate_pages(&cache, &[pages::SALES, pages::PRODUCTS])
            .await
            .unwrap();

        assert!(!cache.exists(pages::SALES).await.unwrap());
        assert!(!cache.exists(pages::PRODUCTS).await.unwrap());
        assert!(cache.exists(pages::BUDGETS).await.unwrap());
    }
}
