//! Donor account entity and stored credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Donor gender as recorded at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A registered donor account.
///
/// The national identity number is never stored in the clear: only its
/// SHA-256 digest (for uniqueness checks) and a masked rendering (for
/// display) are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Email address, unique per account.
    pub email: String,
    /// Full legal name.
    pub full_name: String,
    /// Donor gender.
    pub gender: Gender,
    /// SHA-256 hex digest of the national identity number.
    #[serde(skip_serializing)]
    pub national_id_digest: String,
    /// Masked national identity number (first two and last two digits).
    pub national_id_masked: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country_iso_code: String,
    /// International dialing code.
    pub dial_code: String,
    /// Phone number without dial code.
    pub phone_number: String,
    /// Whether the account completed OTP activation.
    pub activated: bool,
    /// Whether the account is administratively locked.
    pub locked: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check if the account can authenticate right now.
    pub fn can_authenticate(&self) -> bool {
        self.activated && !self.locked
    }
}

/// An account's stored credential hash.
///
/// The hash is a self-describing Argon2id string; the plaintext secret is
/// never persisted anywhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    /// Owning account.
    pub account_id: Uuid,
    /// Encoded Argon2id hash string.
    #[serde(skip_serializing)]
    pub hash: String,
    /// When the credential was set.
    pub created_at: DateTime<Utc>,
}
