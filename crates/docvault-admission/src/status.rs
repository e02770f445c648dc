//! Scan-status tracking for admission polling.
//!
//! Ephemeral by design: losing this map only degrades status-polling UX,
//! never the correctness of the event log.

use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docvault_core::types::id::DocumentId;

/// Admission progress of one pending upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    /// No upload is known for this id.
    NotFound,
    /// The worker has picked the item up and the scan is in flight.
    Scanning,
    /// The scan passed and the upload was committed.
    Clean,
    /// The scan flagged the content; nothing was committed.
    Malicious,
    /// The pipeline failed on this item.
    Error,
}

impl ScanStatus {
    /// The wire string for status polling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Scanning => "scanning",
            Self::Clean => "clean",
            Self::Malicious => "malicious",
            Self::Error => "error",
        }
    }

    /// Whether this status can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Clean | Self::Malicious | Self::Error)
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concurrent map of document id to scan status.
#[derive(Debug, Default)]
pub struct StatusTracker {
    statuses: DashMap<DocumentId, ScanStatus>,
}

impl StatusTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status of an upload. A terminal status is never
    /// overwritten back to `scanning`.
    pub fn set(&self, id: DocumentId, status: ScanStatus) {
        if status == ScanStatus::Scanning {
            if let Some(current) = self.statuses.get(&id) {
                if current.is_terminal() {
                    debug!(document_id = %id, current = %*current, "Ignoring scanning transition from terminal status");
                    return;
                }
            }
        }
        self.statuses.insert(id, status);
    }

    /// Look up the status of an upload, defaulting to
    /// [`ScanStatus::NotFound`].
    pub fn get(&self, id: DocumentId) -> ScanStatus {
        self.statuses
            .get(&id)
            .map(|s| *s)
            .unwrap_or(ScanStatus::NotFound)
    }

    /// Drop the tracked status for an id.
    pub fn remove(&self, id: DocumentId) {
        self.statuses.remove(&id);
    }
}
