//! Document lifecycle operations over the event log.
//!
//! Reads go through the projection cache; every log append invalidates
//! that cache, so a read after any write always refolds from the log.
//! Uploads are not written here at all — they are enqueued for the scan
//! worker, and the caller learns the outcome by polling scan status.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use docvault_admission::queue::{AdmissionQueue, PendingUpload};
use docvault_admission::status::{ScanStatus, StatusTracker};
use docvault_cache::keys;
use docvault_core::error::AppError;
use docvault_core::events::{DocumentEvent, DocumentEventKind};
use docvault_core::result::AppResult;
use docvault_core::traits::cache::ProjectionCache;
use docvault_core::types::id::DocumentId;
use docvault_core::types::pagination::{PageRequest, PageResponse};
use docvault_eventstore::document::Document;
use docvault_eventstore::log::EventLog;
use docvault_eventstore::projection;

use crate::context::RequestContext;

/// A new upload submitted for admission.
#[derive(Debug, Clone)]
pub struct UploadDocumentRequest {
    /// Display name for the document.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Tags to attach on admission.
    pub tags: Vec<String>,
    /// User-chosen version ordinal.
    pub version: Option<f64>,
    /// Original file name.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// The file content.
    pub content: Bytes,
}

/// A partial update to an existing document. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateDocumentRequest {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
    /// User-chosen version ordinal for this revision.
    pub version: Option<f64>,
}

/// Service for the document lifecycle: queued admission, cached reads,
/// event-sourced mutation, rollback, and scan-status polling.
pub struct DocumentService {
    log: Arc<EventLog>,
    cache: Arc<dyn ProjectionCache>,
    queue: Arc<AdmissionQueue>,
    status: Arc<StatusTracker>,
    max_upload_size_bytes: u64,
}

impl DocumentService {
    pub fn new(
        log: Arc<EventLog>,
        cache: Arc<dyn ProjectionCache>,
        queue: Arc<AdmissionQueue>,
        status: Arc<StatusTracker>,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            log,
            cache,
            queue,
            status,
            max_upload_size_bytes,
        }
    }

    /// Accept an upload for admission and return the new document id
    /// immediately.
    ///
    /// Nothing is written to the log or to blob storage here; the scan
    /// worker commits the upload only after a clean verdict. Until the
    /// worker picks the item up, polling the id reports `not_found`.
    pub async fn accept_upload(
        &self,
        ctx: &RequestContext,
        request: UploadDocumentRequest,
    ) -> AppResult<DocumentId> {
        if request.name.trim().is_empty() {
            return Err(AppError::validation("Document name must not be empty"));
        }
        if request.file_name.trim().is_empty() {
            return Err(AppError::validation("File name must not be empty"));
        }
        if request.content.is_empty() {
            return Err(AppError::validation("Uploaded content must not be empty"));
        }
        if request.content.len() as u64 > self.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "Upload of {} bytes exceeds the {} byte limit",
                request.content.len(),
                self.max_upload_size_bytes
            )));
        }

        let document_id = DocumentId::new();
        self.queue
            .enqueue(PendingUpload {
                document_id,
                name: request.name,
                description: request.description,
                tags: request.tags,
                version: request.version,
                uploaded_by: ctx.user_id,
                file_name: request.file_name,
                content_type: request.content_type,
                content: request.content,
                enqueued_at: Utc::now(),
            })
            .await?;

        info!(%document_id, user_id = %ctx.user_id, "Upload accepted for admission");
        Ok(document_id)
    }

    /// Admission progress of an upload.
    pub fn scan_status(&self, document_id: DocumentId) -> ScanStatus {
        self.status.get(document_id)
    }

    /// Fetch one document's current projection.
    ///
    /// Tombstoned documents report `NotFound` unless `include_deleted`.
    pub async fn get(
        &self,
        document_id: DocumentId,
        include_deleted: bool,
    ) -> AppResult<Document> {
        let key = keys::document_by_id(document_id.into_uuid());
        let doc = match self.cached::<Document>(&key).await {
            Some(doc) => doc,
            None => {
                let events = self.log.list_by_aggregate(document_id).await;
                let doc = projection::fold(&events)
                    .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
                self.store(&key, &doc).await;
                doc
            }
        };

        if doc.deleted && !include_deleted {
            return Err(AppError::not_found(format!(
                "Document {document_id} not found"
            )));
        }
        Ok(doc)
    }

    /// List documents, paginated over folded entities.
    pub async fn list(
        &self,
        page: &PageRequest,
        include_deleted: bool,
    ) -> AppResult<PageResponse<Document>> {
        let key = keys::document_page(page.page, page.page_size, include_deleted);
        if let Some(cached) = self.cached::<PageResponse<Document>>(&key).await {
            return Ok(cached);
        }

        let events = self.log.list_all().await;
        let response = projection::fold_page(&events, page, include_deleted);
        self.store(&key, &response).await;
        Ok(response)
    }

    /// Apply a partial update and return the refolded projection.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        request: UpdateDocumentRequest,
    ) -> AppResult<Document> {
        let current = self.active(document_id).await?;
        if request.name.is_none() && request.description.is_none() && request.tags.is_none() {
            return Ok(current);
        }

        self.log
            .append(DocumentEvent::new(
                document_id,
                request.version,
                DocumentEventKind::Updated {
                    name: request.name,
                    description: request.description,
                    tags: request.tags,
                    updated_by: ctx.user_id,
                },
            ))
            .await?;

        self.get(document_id, false).await
    }

    /// Soft-delete a document by appending a tombstone event.
    ///
    /// Deleting an already-tombstoned document is a no-op.
    pub async fn delete(&self, ctx: &RequestContext, document_id: DocumentId) -> AppResult<()> {
        let events = self.log.list_by_aggregate(document_id).await;
        let doc = projection::fold(&events)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        if doc.deleted {
            debug!(%document_id, "Delete on tombstoned document is a no-op");
            return Ok(());
        }

        self.log
            .append(DocumentEvent::new(
                document_id,
                None,
                DocumentEventKind::Deleted {
                    deleted_by: ctx.user_id,
                },
            ))
            .await?;
        info!(%document_id, user_id = %ctx.user_id, "Document tombstoned");
        Ok(())
    }

    /// Roll the projection back to `target_version` by appending a
    /// rollback event that carries the replayable subset of history.
    ///
    /// History is never rewritten: the aggregate's full event sequence
    /// stays in the log, and a later rollback can target any version.
    pub async fn rollback(
        &self,
        ctx: &RequestContext,
        document_id: DocumentId,
        target_version: f64,
    ) -> AppResult<Document> {
        let events = self.log.list_by_aggregate(document_id).await;
        if events.is_empty() {
            return Err(AppError::not_found(format!(
                "Document {document_id} not found"
            )));
        }

        // Carry every non-rollback event at or below the target version.
        // Rollback events themselves are excluded so the carried subset
        // replays cleanly on its own.
        let reapply: Vec<DocumentEvent> = events
            .iter()
            .filter(|e| !matches!(e.kind, DocumentEventKind::RolledBack { .. }))
            .filter(|e| e.version.is_some_and(|v| v <= target_version))
            .cloned()
            .collect();
        if reapply.is_empty() {
            return Err(AppError::validation(format!(
                "Document {document_id} has no events at or below version {target_version}"
            )));
        }

        self.log
            .append(DocumentEvent::new(
                document_id,
                None,
                DocumentEventKind::RolledBack {
                    target_version,
                    reapply,
                    rolled_back_by: ctx.user_id,
                },
            ))
            .await?;
        info!(%document_id, target_version, user_id = %ctx.user_id, "Document rolled back");

        self.get(document_id, true).await
    }

    /// Fetch a document that must exist and must not be tombstoned.
    async fn active(&self, document_id: DocumentId) -> AppResult<Document> {
        self.get(document_id, false).await
    }

    /// Read-through cache lookup. Cache failures degrade to a refold,
    /// never to a request failure.
    async fn cached<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.cache.get(key).await {
            Ok(Some(value)) => match serde_json::from_str(&value) {
                Ok(parsed) => {
                    debug!(key, "Projection cache hit");
                    Some(parsed)
                }
                Err(e) => {
                    warn!(key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Projection cache read failed");
                None
            }
        }
    }

    /// Populate the cache after a refold. Failures are logged only.
    async fn store<T: serde::Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "Failed to serialize projection for cache");
                return;
            }
        };
        if let Err(e) = self.cache.set_default(key, &json).await {
            warn!(key, error = %e, "Projection cache write failed");
        }
    }
}

impl std::fmt::Debug for DocumentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentService")
            .field("max_upload_size_bytes", &self.max_upload_size_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_cache::memory::MemoryProjectionCache;
    use docvault_core::config::cache::CacheConfig;
    use docvault_core::error::ErrorKind;
    use docvault_core::types::id::UserId;

    fn service() -> (DocumentService, Arc<EventLog>, Arc<AdmissionQueue>) {
        let cache: Arc<dyn ProjectionCache> =
            Arc::new(MemoryProjectionCache::new(&CacheConfig::default()));
        let log = Arc::new(EventLog::with_cache(cache.clone()));
        let queue = Arc::new(AdmissionQueue::new(16));
        let status = Arc::new(StatusTracker::new());
        let svc = DocumentService::new(
            log.clone(),
            cache,
            queue.clone(),
            status,
            1024,
        );
        (svc, log, queue)
    }

    fn ctx() -> RequestContext {
        RequestContext::new(UserId::new())
    }

    fn upload_request(name: &str) -> UploadDocumentRequest {
        UploadDocumentRequest {
            name: name.to_string(),
            description: format!("{name} description"),
            tags: vec!["test".into()],
            version: Some(1.0),
            file_name: format!("{name}.pdf"),
            content_type: "application/pdf".into(),
            content: Bytes::from_static(b"content"),
        }
    }

    async fn seed(log: &EventLog, ctx: &RequestContext, name: &str, version: f64) -> DocumentId {
        let id = DocumentId::new();
        log.append(DocumentEvent::new(
            id,
            Some(version),
            DocumentEventKind::Uploaded {
                name: name.to_string(),
                description: format!("{name} description"),
                file_url: format!("{id}/{name}.pdf"),
                content_type: "application/pdf".into(),
                size_bytes: 7,
                uploaded_by: ctx.user_id,
                tags: vec![],
            },
        ))
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn test_accept_upload_enqueues_and_returns_id() {
        let (svc, log, queue) = service();
        let ctx = ctx();

        let id = svc.accept_upload(&ctx, upload_request("report")).await.unwrap();

        // Nothing is committed before the scan verdict.
        assert!(log.is_empty().await);
        assert_eq!(queue.depth().await, 1);
        assert_eq!(queue.try_peek().await.unwrap().document_id, id);
        assert_eq!(svc.scan_status(id), ScanStatus::NotFound);
    }

    #[tokio::test]
    async fn test_accept_upload_validation() {
        let (svc, _log, queue) = service();
        let ctx = ctx();

        let mut nameless = upload_request("report");
        nameless.name = "  ".into();
        let err = svc.accept_upload(&ctx, nameless).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let mut oversized = upload_request("report");
        oversized.content = Bytes::from(vec![0u8; 2048]);
        let err = svc.accept_upload(&ctx, oversized).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        assert_eq!(queue.depth().await, 0);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let (svc, _log, _queue) = service();
        let err = svc.get(DocumentId::new(), false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_is_visible_through_cache() {
        let (svc, log, _queue) = service();
        let ctx = ctx();
        let id = seed(&log, &ctx, "report", 1.0).await;

        // Prime the cache.
        assert_eq!(svc.get(id, false).await.unwrap().name, "report");

        let updated = svc
            .update(
                &ctx,
                id,
                UpdateDocumentRequest {
                    name: Some("renamed".into()),
                    version: Some(2.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "renamed");

        // The append invalidated the primed entry.
        assert_eq!(svc.get(id, false).await.unwrap().name, "renamed");
    }

    #[tokio::test]
    async fn test_empty_update_appends_nothing() {
        let (svc, log, _queue) = service();
        let ctx = ctx();
        let id = seed(&log, &ctx, "report", 1.0).await;

        svc.update(&ctx, id, UpdateDocumentRequest::default())
            .await
            .unwrap();
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_hides_document_and_is_idempotent() {
        let (svc, log, _queue) = service();
        let ctx = ctx();
        let id = seed(&log, &ctx, "doomed", 1.0).await;

        svc.delete(&ctx, id).await.unwrap();
        svc.delete(&ctx, id).await.unwrap();
        assert_eq!(log.len().await, 2);

        let err = svc.get(id, false).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let doc = svc.get(id, true).await.unwrap();
        assert!(doc.deleted);
    }

    #[tokio::test]
    async fn test_updating_deleted_document_fails() {
        let (svc, log, _queue) = service();
        let ctx = ctx();
        let id = seed(&log, &ctx, "doomed", 1.0).await;
        svc.delete(&ctx, id).await.unwrap();

        let err = svc
            .update(
                &ctx,
                id,
                UpdateDocumentRequest {
                    name: Some("zombie".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rollback_restores_target_version() {
        let (svc, log, _queue) = service();
        let ctx = ctx();
        let id = seed(&log, &ctx, "v1", 1.0).await;

        for (name, version) in [("v2", 2.0), ("v3", 3.0), ("v4", 4.0)] {
            svc.update(
                &ctx,
                id,
                UpdateDocumentRequest {
                    name: Some(name.into()),
                    version: Some(version),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let rolled = svc.rollback(&ctx, id, 3.0).await.unwrap();
        assert_eq!(rolled.name, "v3");
        assert_eq!(rolled.version, Some(3.0));

        // Full history is preserved: 1 upload + 3 updates + 1 rollback.
        assert_eq!(log.len().await, 5);
    }

    #[tokio::test]
    async fn test_rollback_below_history_is_rejected() {
        let (svc, log, _queue) = service();
        let ctx = ctx();
        let id = seed(&log, &ctx, "report", 5.0).await;

        let err = svc.rollback(&ctx, id, 2.0).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_paginates_entities() {
        let (svc, log, _queue) = service();
        let ctx = ctx();
        for i in 0..5 {
            seed(&log, &ctx, &format!("doc{i}"), 1.0).await;
        }

        let page = svc.list(&PageRequest::new(1, 2), false).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_items, 5);
        assert_eq!(page.total_pages, 3);

        // Cached page is returned as-is until the next write.
        let cached = svc.list(&PageRequest::new(1, 2), false).await.unwrap();
        assert_eq!(cached.total_items, 5);

        // A new append invalidates the cached page.
        seed(&log, &ctx, "doc5", 1.0).await;
        let refreshed = svc.list(&PageRequest::new(1, 2), false).await.unwrap();
        assert_eq!(refreshed.total_items, 6);
    }
}
