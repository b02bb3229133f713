//! Session token configuration.

use serde::{Deserialize, Serialize};

/// Signed session token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Path to the Ed25519 private key (PKCS#8 PEM).
    pub private_key_path: String,
    /// Path to the Ed25519 public key (SPKI PEM).
    pub public_key_path: String,
    /// Token audience claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Token issuer claim.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,
}

fn default_audience() -> String {
    "com.lifedrop.platform".to_string()
}

fn default_issuer() -> String {
    "https://api.lifedrop.org".to_string()
}

fn default_ttl_minutes() -> u64 {
    30
}
