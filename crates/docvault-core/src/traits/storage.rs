//! Blob storage trait for pluggable content backends.
//!
//! Keys are namespaced by aggregate id as a path prefix
//! (`{document_id}/{file_name}`), which is what makes `delete_prefix`
//! sufficient to erase every blob a document ever owned.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for blob storage backends.
///
/// The default backend is the local filesystem; an S3 implementation
/// would slot in behind the same trait.
#[async_trait]
pub trait BlobStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Write the full content to the given key, creating parents as needed.
    async fn upload(&self, key: &str, content_type: &str, data: Bytes) -> AppResult<()>;

    /// Read the full content at the given key. Fails with `NotFound` if
    /// the key is absent.
    async fn download(&self, key: &str) -> AppResult<Bytes>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Delete every blob whose key starts with the given prefix.
    async fn delete_prefix(&self, prefix: &str) -> AppResult<()>;
}
