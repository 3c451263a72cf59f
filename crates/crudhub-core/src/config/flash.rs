//! Flash message store configuration.

use serde::{Deserialize, Serialize};

/// Limits of the in-memory flash message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashConfig {
    /// Maximum number of sessions holding pending messages.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
    /// Seconds after which an untouched session's messages are dropped.
    #[serde(default = "default_time_to_idle")]
    pub time_to_idle_seconds: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            time_to_idle_seconds: default_time_to_idle(),
        }
    }
}

fn default_max_sessions() -> u64 {
    10000
}

fn default_time_to_idle() -> u64 {
    1800
}
