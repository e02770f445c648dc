//! Virus-scan collaborator trait.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Outcome of scanning one content snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanVerdict {
    /// No threat detected.
    Clean,
    /// A threat was detected; carries the signature name when known.
    Infected(String),
}

impl ScanVerdict {
    /// Whether the content may be admitted.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Trait for virus-scan backends.
///
/// The scanner receives a fully materialized content snapshot, never the
/// original request stream. A scan *error* is surfaced through the
/// `AppResult` and is not the same as an [`ScanVerdict::Infected`]
/// verdict: errors fail the pipeline item, verdicts gate admission.
#[async_trait]
pub trait VirusScanner: Send + Sync + std::fmt::Debug + 'static {
    /// Scan the given content and return a verdict.
    async fn scan(&self, data: &Bytes, file_name: &str, content_type: &str)
    -> AppResult<ScanVerdict>;
}
