//! Rate limiter configuration.

use serde::{Deserialize, Serialize};

/// Token-bucket rate limiter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests permitted per key per window.
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// Window length in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            window_seconds: default_window_seconds(),
        }
    }
}

fn default_threshold() -> u32 {
    20
}

fn default_window_seconds() -> u64 {
    60
}
