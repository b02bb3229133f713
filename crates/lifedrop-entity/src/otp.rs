//! One-time password entity for account activation and recovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What flow an OTP belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "otp_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OtpKind {
    /// Account activation after registration.
    Activation,
    /// Password recovery.
    Recovery,
}

/// A one-time code issued to an account.
///
/// The code itself is never stored; only its SHA-256 hex digest is.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Otp {
    /// Unique OTP identifier.
    pub id: Uuid,
    /// Owning account.
    pub account_id: Uuid,
    /// SHA-256 hex digest of the code.
    pub code_digest: String,
    /// Flow this code belongs to.
    pub kind: OtpKind,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
    /// When the code was issued.
    pub created_at: DateTime<Utc>,
}

impl Otp {
    /// Check whether the code is still redeemable at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
