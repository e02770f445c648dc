//! Deletion saga configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the cross-service deletion saga.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SagaConfig {
    /// Bounded wait in seconds for a saga to reach a terminal state.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    15
}
