//! Signed claims embedded in every session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;

/// Claims payload of a session token.
///
/// Created once at issuance and never mutated; the signature covers the
/// canonical encoding of this structure byte-for-byte.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer.
    pub iss: String,
    /// Subject — the account ID as a string.
    pub sub: String,
    /// Audience.
    pub aud: String,
    /// Expiration (seconds since epoch).
    pub exp: i64,
    /// Not-before (seconds since epoch).
    pub nbf: i64,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Unique token identifier.
    pub jti: String,
    /// Client platform tag ("web", "android", ...).
    pub platform: String,
}

impl Claims {
    /// Parses the subject claim as an account ID.
    pub fn subject_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub)
            .map_err(|e| AppError::authentication(format!("invalid subject claim: {e}")))
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
