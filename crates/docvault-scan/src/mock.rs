//! Deterministic scanner for tests.

use async_trait::async_trait;
use bytes::Bytes;

use docvault_core::result::AppResult;
use docvault_core::error::AppError;
use docvault_core::traits::scanner::{ScanVerdict, VirusScanner};

/// Content marker the mock treats as infected.
pub const INFECTED_MARKER: &[u8] = b"EICAR";
/// File-name marker the mock treats as a scan failure.
pub const ERROR_MARKER: &str = "scan-error";

/// Scanner that decides by inspecting the content and file name:
/// content containing [`INFECTED_MARKER`] is infected, a file name
/// containing [`ERROR_MARKER`] fails the scan, everything else is clean.
#[derive(Debug, Clone, Default)]
pub struct MockScanner;

impl MockScanner {
    /// Create a new mock scanner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VirusScanner for MockScanner {
    async fn scan(
        &self,
        data: &Bytes,
        file_name: &str,
        _content_type: &str,
    ) -> AppResult<ScanVerdict> {
        if file_name.contains(ERROR_MARKER) {
            return Err(AppError::scan("mock scanner failure"));
        }
        if data
            .windows(INFECTED_MARKER.len())
            .any(|w| w == INFECTED_MARKER)
        {
            return Ok(ScanVerdict::Infected("Eicar-Test-Signature".to_string()));
        }
        Ok(ScanVerdict::Clean)
    }
}
