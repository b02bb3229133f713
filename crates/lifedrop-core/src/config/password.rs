//! Credential hashing configuration.

use serde::{Deserialize, Serialize};

/// Argon2id credential hashing configuration.
///
/// The pepper is a server-wide secret mixed into every password before
/// hashing, distinct from the per-record random salt. Minimum values are
/// enforced at hasher construction, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Server-wide secret pepper. Must be at least 32 characters.
    #[serde(skip_serializing)]
    pub pepper: String,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Argon2 lane count.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
    /// Random salt length in bytes.
    #[serde(default = "default_salt_length")]
    pub salt_length: u32,
    /// Derived key length in bytes.
    #[serde(default = "default_key_length")]
    pub key_length: u32,
}

fn default_memory_kib() -> u32 {
    64 * 1024
}

fn default_iterations() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    2
}

fn default_salt_length() -> u32 {
    16
}

fn default_key_length() -> u32 {
    32
}
