//! Document lifecycle events.
//!
//! The four lifecycle variants form a closed sum type, so the projection
//! fold is an exhaustive match: adding a variant without handling it in
//! the fold is a compile error, not a silently ignored runtime case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{DocumentId, EventId, UserId};

/// A single immutable lifecycle event for one document aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEvent {
    /// Event identity.
    pub id: EventId,
    /// The aggregate this event belongs to.
    pub aggregate_id: DocumentId,
    /// Wall-clock time the event occurred (UTC). Folding orders by this
    /// field; ties preserve insertion order.
    pub occurred_at: DateTime<Utc>,
    /// Optional user-chosen version ordinal.
    pub version: Option<f64>,
    /// The event payload.
    pub kind: DocumentEventKind,
}

impl DocumentEvent {
    /// Create a new event stamped with the current time.
    pub fn new(aggregate_id: DocumentId, version: Option<f64>, kind: DocumentEventKind) -> Self {
        Self {
            id: EventId::new(),
            aggregate_id,
            occurred_at: Utc::now(),
            version,
            kind,
        }
    }

    /// Whether this event tombstones the aggregate.
    pub fn is_tombstone(&self) -> bool {
        matches!(self.kind, DocumentEventKind::Deleted { .. })
    }
}

/// Payload variants for [`DocumentEvent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocumentEventKind {
    /// A scanned-clean file was admitted into the store.
    Uploaded {
        /// Display name of the document.
        name: String,
        /// Free-form description.
        description: String,
        /// Blob storage URL/key of the content.
        file_url: String,
        /// MIME type of the content.
        content_type: String,
        /// Content size in bytes.
        size_bytes: u64,
        /// The user who uploaded the file.
        uploaded_by: UserId,
        /// Tags attached at upload time.
        tags: Vec<String>,
    },
    /// Metadata fields were changed. `None` fields are left untouched
    /// by the fold.
    Updated {
        /// New name, if changed.
        name: Option<String>,
        /// New description, if changed.
        description: Option<String>,
        /// Replacement tag set, if changed.
        tags: Option<Vec<String>>,
        /// The user who made the change.
        updated_by: UserId,
    },
    /// The document was soft-deleted. This is a tombstone marker; the
    /// aggregate's history stays in the log.
    Deleted {
        /// The user who deleted the document.
        deleted_by: UserId,
    },
    /// The document was reset to an earlier version. Carries the subset of
    /// prior events to replay, so rollback is itself an event and the full
    /// history is preserved.
    RolledBack {
        /// The version the document was reset to.
        target_version: f64,
        /// Prior events (version <= target) to replay from scratch.
        reapply: Vec<DocumentEvent>,
        /// The user who performed the rollback.
        rolled_back_by: UserId,
    },
}
