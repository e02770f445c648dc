//! Projection cache trait.
//!
//! The cache is correctness-sensitive: every write to the event log must
//! blanket-invalidate it, so a read after any write always refolds from
//! the log. TTL is only a secondary bound.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for the invalidate-on-write projection cache.
///
/// All values are serialized as JSON strings. Implementations must track
/// every key ever set so that [`ProjectionCache::invalidate_all`] can
/// remove them all.
#[async_trait]
pub trait ProjectionCache: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has
    /// expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL, recording the key for later invalidation.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Set a value with the default TTL.
    async fn set_default(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove every recorded key and clear the key registry.
    async fn invalidate_all(&self) -> AppResult<()>;

    /// Check that the cache backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => {
                let parsed = serde_json::from_str(&value)?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(&self, key: &str, value: &T) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set_default(key, &json).await
    }
}
