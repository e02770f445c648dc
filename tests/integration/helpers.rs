//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tempfile::TempDir;
use tokio::sync::watch;

use docvault_admission::queue::AdmissionQueue;
use docvault_admission::status::{ScanStatus, StatusTracker};
use docvault_admission::worker::ScanWorker;
use docvault_cache::memory::MemoryProjectionCache;
use docvault_core::config::admission::AdmissionConfig;
use docvault_core::config::cache::CacheConfig;
use docvault_core::traits::cache::ProjectionCache;
use docvault_core::traits::storage::BlobStorage;
use docvault_core::types::id::{DocumentId, UserId};
use docvault_eventstore::log::EventLog;
use docvault_saga::{DocumentEraseHandler, MessageChannel, SagaCoordinator};
use docvault_scan::MockScanner;
use docvault_service::document::UploadDocumentRequest;
use docvault_service::{DocumentService, RequestContext, UserService};
use docvault_storage::local::LocalBlobStorage;

/// Fully wired application with a deterministic scanner and temp storage.
pub struct TestApp {
    pub documents: Arc<DocumentService>,
    pub users: Arc<UserService>,
    pub log: Arc<EventLog>,
    pub storage: Arc<dyn BlobStorage>,
    shutdown: watch::Sender<bool>,
    _data_dir: TempDir,
}

impl TestApp {
    /// Wire the full stack with all background loops running.
    pub async fn spawn() -> Self {
        Self::build(true, Duration::from_secs(5)).await
    }

    /// Wire the stack without the document-side erase handler, so every
    /// deletion saga times out after `saga_timeout`.
    pub async fn spawn_without_erase_handler(saga_timeout: Duration) -> Self {
        Self::build(false, saga_timeout).await
    }

    async fn build(with_erase_handler: bool, saga_timeout: Duration) -> Self {
        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let cache: Arc<dyn ProjectionCache> =
            Arc::new(MemoryProjectionCache::new(&CacheConfig::default()));
        let log = Arc::new(EventLog::with_cache(Arc::clone(&cache)));
        let storage: Arc<dyn BlobStorage> = Arc::new(
            LocalBlobStorage::new(data_dir.path().to_str().unwrap())
                .await
                .expect("Failed to init storage"),
        );
        let queue = Arc::new(AdmissionQueue::new(64));
        let status = Arc::new(StatusTracker::new());
        let channel = Arc::new(MessageChannel::new());

        let (shutdown, shutdown_rx) = watch::channel(false);

        let worker = ScanWorker::new(
            Arc::clone(&queue),
            Arc::new(MockScanner::new()),
            Arc::clone(&storage),
            Arc::clone(&log),
            Arc::clone(&status),
            AdmissionConfig::default(),
        );
        {
            let rx = shutdown_rx.clone();
            tokio::spawn(async move { worker.run(rx).await });
        }

        let coordinator = Arc::new(SagaCoordinator::with_timeout(
            Arc::clone(&channel),
            saga_timeout,
        ));
        {
            let coordinator = Arc::clone(&coordinator);
            let rx = shutdown_rx.clone();
            tokio::spawn(async move { coordinator.run(rx).await });
        }
        if with_erase_handler {
            let handler = DocumentEraseHandler::new(
                Arc::clone(&channel),
                Arc::clone(&log),
                Arc::clone(&storage),
            );
            let rx = shutdown_rx.clone();
            tokio::spawn(async move { handler.run(rx).await });
        }

        let documents = Arc::new(DocumentService::new(
            Arc::clone(&log),
            cache,
            queue,
            Arc::clone(&status),
            1024 * 1024,
        ));
        let users = Arc::new(UserService::new(coordinator));

        Self {
            documents,
            users,
            log,
            storage,
            shutdown,
            _data_dir: data_dir,
        }
    }

    /// Poll the scan status until it reaches a terminal state.
    pub async fn wait_for_verdict(&self, document_id: DocumentId) -> ScanStatus {
        for _ in 0..500 {
            let status = self.documents.scan_status(document_id);
            if status.is_terminal() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Upload {document_id} never reached a terminal scan status");
    }

    /// Upload and wait for admission; panics unless the verdict is clean.
    pub async fn upload_clean(&self, ctx: &RequestContext, name: &str) -> DocumentId {
        let id = self
            .documents
            .accept_upload(ctx, upload_request(name, b"harmless bytes"))
            .await
            .expect("Upload was not accepted");
        let verdict = self.wait_for_verdict(id).await;
        assert_eq!(verdict, ScanStatus::Clean, "Upload {name} was not admitted");
        id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// An upload request for `name` carrying the given content.
pub fn upload_request(name: &str, content: &'static [u8]) -> UploadDocumentRequest {
    UploadDocumentRequest {
        name: name.to_string(),
        description: format!("{name} description"),
        tags: vec!["integration".into()],
        version: Some(1.0),
        file_name: format!("{name}.pdf"),
        content_type: "application/pdf".into(),
        content: Bytes::from_static(content),
    }
}

/// A request context for a fresh user.
pub fn ctx() -> RequestContext {
    RequestContext::new(UserId::new())
}
