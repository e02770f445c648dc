//! Virus scanner configuration.

use serde::{Deserialize, Serialize};

/// ClamAV scanner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// ClamAV daemon hostname.
    #[serde(default = "default_host")]
    pub host: String,
    /// ClamAV daemon port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timeout in seconds for each scan operation.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3310
}

fn default_timeout() -> u64 {
    30
}
