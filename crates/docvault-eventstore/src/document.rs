//! The materialized document projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use docvault_core::types::id::{DocumentId, UserId};

/// Sentinel file URL for tombstoned documents.
pub const TOMBSTONE_FILE_URL: &str = "deleted";

/// The current (or historical) state of one document aggregate.
///
/// A `Document` is derived exclusively by folding the aggregate's event
/// sequence in chronological order; it is never constructed or mutated by
/// any other path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Aggregate identity.
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Blob storage URL/key, or [`TOMBSTONE_FILE_URL`] once deleted.
    pub file_url: String,
    /// MIME type of the stored content.
    pub content_type: String,
    /// Content size in bytes (zero once deleted).
    pub size_bytes: u64,
    /// The user who uploaded the content (the document's owner).
    pub owned_by: Option<UserId>,
    /// The user who last modified the document.
    pub modified_by: Option<UserId>,
    /// Timestamp of the first event.
    pub created_at: Option<DateTime<Utc>>,
    /// Timestamp of the latest applied event.
    pub updated_at: Option<DateTime<Utc>>,
    /// Tags attached to the document.
    pub tags: Vec<String>,
    /// User-chosen version ordinal, if any.
    pub version: Option<f64>,
    /// Whether a tombstone event has been applied.
    pub deleted: bool,
}

impl Document {
    /// The empty seed state the fold starts from.
    pub fn empty(id: DocumentId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            file_url: String::new(),
            content_type: String::new(),
            size_bytes: 0,
            owned_by: None,
            modified_by: None,
            created_at: None,
            updated_at: None,
            tags: Vec::new(),
            version: None,
            deleted: false,
        }
    }

    /// Collapse this projection into the tombstone state.
    pub(crate) fn tombstone(&mut self) {
        self.file_url = TOMBSTONE_FILE_URL.to_string();
        self.size_bytes = 0;
        self.deleted = true;
    }
}
