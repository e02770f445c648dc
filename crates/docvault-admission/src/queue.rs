//! The admission queue carrying pending uploads from the request path to
//! the scan worker.
//!
//! Multiple producers (concurrent upload requests) and one consumer (the
//! worker loop). The consumer normally blocks on [`AdmissionQueue::recv`]
//! rather than busy-polling; `try_dequeue`/`try_peek` remain for polling
//! callers and for diagnosing a stuck item after a failure.

use std::collections::VecDeque;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify};
use tracing::debug;

use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::types::id::{DocumentId, UserId};

/// A pending upload awaiting its scan verdict.
///
/// `content` is a fully materialized snapshot: the original request body
/// is not safe to retain across the async boundary, so the handler copies
/// it before enqueueing.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    /// The aggregate the upload belongs to.
    pub document_id: DocumentId,
    /// Display name for the document.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Tags to attach on admission.
    pub tags: Vec<String>,
    /// User-chosen version ordinal.
    pub version: Option<f64>,
    /// The uploading user.
    pub uploaded_by: UserId,
    /// Original file name.
    pub file_name: String,
    /// MIME type of the content.
    pub content_type: String,
    /// Independent snapshot of the content.
    pub content: Bytes,
    /// When the item entered the queue.
    pub enqueued_at: DateTime<Utc>,
}

/// Concurrent multi-producer queue of pending uploads.
#[derive(Debug)]
pub struct AdmissionQueue {
    /// Pending items in FIFO order.
    items: Mutex<VecDeque<PendingUpload>>,
    /// Wakes the consumer when an item arrives.
    notify: Notify,
    /// Soft depth bound; enqueue rejects beyond this.
    max_depth: usize,
}

impl AdmissionQueue {
    /// Create a queue with the given soft depth bound.
    pub fn new(max_depth: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            max_depth,
        }
    }

    /// Enqueue a pending upload. Rejects with `QueueFull` once the depth
    /// bound is reached, signalling the caller to retry later.
    pub async fn enqueue(&self, item: PendingUpload) -> AppResult<()> {
        {
            let mut items = self.items.lock().await;
            if items.len() >= self.max_depth {
                return Err(AppError::queue_full(format!(
                    "Admission queue is full ({} pending items), retry later",
                    items.len()
                )));
            }
            items.push_back(item.clone());
        }
        debug!(
            document_id = %item.document_id,
            file_name = %item.file_name,
            bytes = item.content.len(),
            "Enqueued pending upload"
        );
        self.notify.notify_one();
        Ok(())
    }

    /// Remove and return the oldest pending item, if any.
    pub async fn try_dequeue(&self) -> Option<PendingUpload> {
        self.items.lock().await.pop_front()
    }

    /// Inspect the oldest pending item without removing it.
    pub async fn try_peek(&self) -> Option<PendingUpload> {
        self.items.lock().await.front().cloned()
    }

    /// Wait for the next pending item.
    pub async fn recv(&self) -> PendingUpload {
        loop {
            if let Some(item) = self.try_dequeue().await {
                return item;
            }
            self.notify.notified().await;
        }
    }

    /// Number of items currently queued.
    pub async fn depth(&self) -> usize {
        self.items.lock().await.len()
    }
}
