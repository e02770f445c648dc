//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod admission;
pub mod cache;
pub mod logging;
pub mod saga;
pub mod scan;
pub mod storage;

use serde::{Deserialize, Serialize};

use self::admission::AdmissionConfig;
use self::cache::CacheConfig;
use self::logging::LoggingConfig;
use self::saga::SagaConfig;
use self::scan::ScanConfig;
use self::storage::StorageConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Projection cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Admission pipeline settings.
    #[serde(default)]
    pub admission: AdmissionConfig,
    /// Virus scanner settings.
    #[serde(default)]
    pub scan: ScanConfig,
    /// Deletion saga settings.
    #[serde(default)]
    pub saga: SagaConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DOCVAULT_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCVAULT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
