//! In-memory projection cache using the moka crate.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use moka::future::Cache;
use tracing::debug;

use docvault_core::config::cache::CacheConfig;
use docvault_core::result::AppResult;
use docvault_core::traits::cache::ProjectionCache;

/// In-memory projection cache.
///
/// Every key set is recorded in a registry so `invalidate_all` removes
/// exactly the keys the application has used, then clears the registry.
/// moka's TTL is the secondary bound; invalidation is the primary
/// consistency mechanism.
#[derive(Debug, Clone)]
pub struct MemoryProjectionCache {
    /// The underlying moka cache.
    cache: Cache<String, String>,
    /// Registry of every key ever set since the last invalidation.
    keys: std::sync::Arc<DashSet<String>>,
    /// Default TTL for entries.
    default_ttl: Duration,
}

impl MemoryProjectionCache {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.default_ttl_seconds))
            .build();

        Self {
            cache,
            keys: std::sync::Arc::new(DashSet::new()),
            default_ttl: Duration::from_secs(config.default_ttl_seconds),
        }
    }

    /// Number of keys currently recorded in the registry.
    pub fn tracked_keys(&self) -> usize {
        self.keys.len()
    }
}

#[async_trait]
impl ProjectionCache for MemoryProjectionCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> AppResult<()> {
        // moka applies the cache-level TTL configured at construction.
        self.keys.insert(key.to_string());
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        let count = self.keys.len();
        for key in self.keys.iter() {
            self.cache.remove(key.key()).await;
        }
        self.keys.clear();
        debug!(count, "Invalidated all cached projections");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
