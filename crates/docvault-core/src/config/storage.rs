//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for locally stored blobs.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            max_upload_size_bytes: default_max_upload_size(),
        }
    }
}

fn default_data_root() -> String {
    "data/storage".to_string()
}

fn default_max_upload_size() -> u64 {
    // 100 MiB
    100 * 1024 * 1024
}
