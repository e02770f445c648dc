//! Scan worker — the background loop that turns pending uploads into
//! events, or refuses them.
//!
//! One item's failure never stops the loop: scan errors and storage
//! errors are contained per item, logged, and downgraded to status
//! `error`. A malicious verdict appends nothing — the upload leaves no
//! trace in the document's history.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use docvault_core::config::admission::AdmissionConfig;
use docvault_core::events::{DocumentEvent, DocumentEventKind};
use docvault_core::result::AppResult;
use docvault_core::traits::scanner::VirusScanner;
use docvault_core::traits::storage::BlobStorage;
use docvault_eventstore::EventLog;
use docvault_storage::blob_key;

use crate::queue::{AdmissionQueue, PendingUpload};
use crate::status::{ScanStatus, StatusTracker};

/// Background worker that consumes the admission queue.
pub struct ScanWorker {
    /// Pending uploads.
    queue: Arc<AdmissionQueue>,
    /// Virus-scan collaborator.
    scanner: Arc<dyn VirusScanner>,
    /// Blob storage for admitted content.
    storage: Arc<dyn BlobStorage>,
    /// The event log admitted uploads are appended to.
    log: Arc<EventLog>,
    /// Status map polled by clients.
    status: Arc<StatusTracker>,
    /// Worker configuration.
    config: AdmissionConfig,
}

impl std::fmt::Debug for ScanWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanWorker").finish()
    }
}

impl ScanWorker {
    /// Create a new scan worker.
    pub fn new(
        queue: Arc<AdmissionQueue>,
        scanner: Arc<dyn VirusScanner>,
        storage: Arc<dyn BlobStorage>,
        log: Arc<EventLog>,
        status: Arc<StatusTracker>,
        config: AdmissionConfig,
    ) -> Self {
        Self {
            queue,
            scanner,
            storage,
            log,
            status,
            config,
        }
    }

    /// Run until the cancel signal is received. The signal is checked
    /// between items; an in-flight item is always finished first.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            poll_interval_s = self.config.poll_interval_seconds,
            max_queue_depth = self.config.max_queue_depth,
            "Scan worker started"
        );

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Scan worker received shutdown signal");
                        break;
                    }
                }
                item = self.queue.recv() => {
                    self.process(item).await;
                }
            }
        }

        let remaining = self.queue.depth().await;
        if remaining > 0 {
            warn!(remaining, "Scan worker shut down with pending items");
        }
        info!("Scan worker shut down");
    }

    /// Process one dequeued item, containing any failure.
    async fn process(&self, item: PendingUpload) {
        let document_id = item.document_id;
        self.status.set(document_id, ScanStatus::Scanning);

        match self.scan_and_commit(&item).await {
            Ok(admitted) => {
                if admitted {
                    self.status.set(document_id, ScanStatus::Clean);
                    info!(
                        document_id = %document_id,
                        file_name = %item.file_name,
                        "Upload admitted"
                    );
                } else {
                    self.status.set(document_id, ScanStatus::Malicious);
                    warn!(
                        document_id = %document_id,
                        file_name = %item.file_name,
                        "Upload refused: malicious content"
                    );
                }
            }
            Err(e) => {
                self.status.set(document_id, ScanStatus::Error);
                error!(
                    document_id = %document_id,
                    file_name = %item.file_name,
                    error = %e,
                    "Admission pipeline failed for item"
                );
            }
        }
    }

    /// Scan the snapshot; on a clean verdict write the blob and append the
    /// `Uploaded` event. Returns whether the upload was admitted.
    async fn scan_and_commit(&self, item: &PendingUpload) -> AppResult<bool> {
        let verdict = self
            .scanner
            .scan(&item.content, &item.file_name, &item.content_type)
            .await?;

        if !verdict.is_clean() {
            return Ok(false);
        }

        let key = blob_key(item.document_id, &item.file_name, item.version);
        self.storage
            .upload(&key, &item.content_type, item.content.clone())
            .await?;

        let event = DocumentEvent::new(
            item.document_id,
            item.version,
            DocumentEventKind::Uploaded {
                name: item.name.clone(),
                description: item.description.clone(),
                file_url: key,
                content_type: item.content_type.clone(),
                size_bytes: item.content.len() as u64,
                uploaded_by: item.uploaded_by,
                tags: item.tags.clone(),
            },
        );
        self.log.append(event).await?;

        Ok(true)
    }
}
