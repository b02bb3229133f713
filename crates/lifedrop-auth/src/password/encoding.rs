//! Self-describing credential hash encoding.
//!
//! Layout: `argon2id$v=19$m=<mem>,t=<iter>,p=<par>$<b64salt>$<b64key>`.
//! Exactly five `$`-separated fields, base64 without padding, canonical
//! field order. Any other shape is a parse error.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;

use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;

/// Algorithm tag embedded in every encoded hash.
pub const ALGORITHM: &str = "argon2id";

/// Argon2 version embedded in every encoded hash (0x13).
pub const VERSION: u32 = 19;

const FIELD_COUNT: usize = 5;

/// A parsed credential hash: cost parameters, salt, and derived key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHash {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Iteration count.
    pub iterations: u32,
    /// Lane count.
    pub parallelism: u32,
    /// Per-record random salt.
    pub salt: Vec<u8>,
    /// Derived key.
    pub key: Vec<u8>,
}

impl EncodedHash {
    /// Renders the hash as its canonical single-string form.
    pub fn encode(&self) -> String {
        format!(
            "{ALGORITHM}$v={VERSION}$m={},t={},p={}${}${}",
            self.memory_kib,
            self.iterations,
            self.parallelism,
            STANDARD_NO_PAD.encode(&self.salt),
            STANDARD_NO_PAD.encode(&self.key),
        )
    }

    /// Parses an encoded hash string.
    ///
    /// Fails with a validation error when the field count, algorithm tag,
    /// version, parameter block, or base64 payloads do not match the
    /// canonical layout.
    pub fn parse(encoded: &str) -> AppResult<Self> {
        if encoded.is_empty() {
            return Err(AppError::validation("credential hash is empty"));
        }

        let parts: Vec<&str> = encoded.split('$').collect();
        if parts.len() != FIELD_COUNT {
            return Err(AppError::validation(format!(
                "invalid credential hash format: expected {FIELD_COUNT} fields, got {}",
                parts.len()
            )));
        }

        if parts[0] != ALGORITHM {
            return Err(AppError::validation(format!(
                "invalid hash algorithm: expected '{ALGORITHM}', got '{}'",
                parts[0]
            )));
        }

        let version = parse_param(parts[1], "v=")?;
        if version != VERSION {
            return Err(AppError::validation(format!(
                "incompatible Argon2 version: expected {VERSION}, got {version}"
            )));
        }

        let params: Vec<&str> = parts[2].split(',').collect();
        if params.len() != 3 {
            return Err(AppError::validation("invalid parameter block"));
        }
        let memory_kib = parse_param(params[0], "m=")?;
        let iterations = parse_param(params[1], "t=")?;
        let parallelism = parse_param(params[2], "p=")?;

        let salt = STANDARD_NO_PAD
            .decode(parts[3])
            .map_err(|e| AppError::validation(format!("invalid salt encoding: {e}")))?;
        let key = STANDARD_NO_PAD
            .decode(parts[4])
            .map_err(|e| AppError::validation(format!("invalid key encoding: {e}")))?;

        Ok(Self {
            memory_kib,
            iterations,
            parallelism,
            salt,
            key,
        })
    }
}

fn parse_param(field: &str, prefix: &str) -> AppResult<u32> {
    field
        .strip_prefix(prefix)
        .ok_or_else(|| AppError::validation(format!("expected '{prefix}' parameter")))?
        .parse::<u32>()
        .map_err(|e| AppError::validation(format!("invalid '{prefix}' parameter: {e}")))
}
