//! ClamAV daemon scanner.
//!
//! Fail-closed: connection failures, protocol errors, and timeouts are
//! surfaced as scan errors, never as a clean verdict. The admission
//! pipeline maps those errors to status `error`, which is distinct from
//! `malicious`.

use std::str;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use clamav_client::{Tcp, clean};
use tracing::{debug, warn};

use docvault_core::config::scan::ScanConfig;
use docvault_core::error::AppError;
use docvault_core::result::AppResult;
use docvault_core::traits::scanner::{ScanVerdict, VirusScanner};

/// Scanner backed by a ClamAV daemon reachable over TCP (INSTREAM).
#[derive(Debug, Clone)]
pub struct ClamAvScanner {
    /// Daemon hostname.
    host: String,
    /// Daemon port (typically 3310).
    port: u16,
    /// Per-scan timeout.
    timeout: Duration,
}

impl ClamAvScanner {
    /// Create a scanner from configuration.
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
impl VirusScanner for ClamAvScanner {
    async fn scan(
        &self,
        data: &Bytes,
        file_name: &str,
        _content_type: &str,
    ) -> AppResult<ScanVerdict> {
        let start = Instant::now();
        debug!(host = %self.host, port = self.port, file_name, "Starting ClamAV scan");

        let data = data.to_vec();
        let address = format!("{}:{}", self.host, self.port);

        // The clamav-client sync API is driven inside spawn_blocking so the
        // worker loop is never pinned on socket I/O.
        let scan_task = tokio::task::spawn_blocking(move || {
            let connection = Tcp {
                host_address: address.as_str(),
            };
            clamav_client::scan_buffer(data.as_slice(), connection, None)
        });

        let response = tokio::time::timeout(self.timeout, scan_task)
            .await
            .map_err(|_| {
                AppError::scan(format!(
                    "ClamAV scan timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| AppError::scan(format!("ClamAV scan task failed: {e}")))?
            .map_err(|e| AppError::scan(format!("ClamAV scan error: {e}")))?;

        let is_clean =
            clean(&response).map_err(|e| AppError::scan(format!("Unparseable ClamAV reply: {e}")))?;

        if is_clean {
            debug!(
                file_name,
                duration_ms = start.elapsed().as_millis(),
                "Scan verdict: clean"
            );
            return Ok(ScanVerdict::Clean);
        }

        let signature = str::from_utf8(&response)
            .ok()
            .and_then(|s| s.split(':').nth(1))
            .and_then(|s| s.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();

        warn!(
            file_name,
            signature = %signature,
            duration_ms = start.elapsed().as_millis(),
            "Scan verdict: infected"
        );
        Ok(ScanVerdict::Infected(signature))
    }
}
