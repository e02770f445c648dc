//! Admission pipeline configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the upload admission pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Whether the scan worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between queue polls when the worker falls back
    /// to polling (the worker normally blocks on the queue).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Soft bound on queue depth. Uploads are rejected with a retry signal
    /// once the queue holds this many pending items.
    #[serde(default = "default_max_depth")]
    pub max_queue_depth: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            poll_interval_seconds: default_poll_interval(),
            max_queue_depth: default_max_depth(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    1
}

fn default_max_depth() -> usize {
    1024
}
