//! Persistence seams for the account flows.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use lifedrop_core::result::AppResult;
use lifedrop_entity::account::{Account, Credential, Gender};
use lifedrop_entity::otp::{Otp, OtpKind};

/// Fields required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub full_name: String,
    pub gender: Gender,
    pub national_id_digest: String,
    pub national_id_masked: String,
    pub country_iso_code: String,
    pub dial_code: String,
    pub phone_number: String,
}

/// Account and credential persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Finds an account by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Finds an account by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Creates a new, not-yet-activated account.
    async fn create(&self, account: &NewAccount) -> AppResult<Account>;

    /// Loads the stored credential for an account, if any.
    async fn credential_for(&self, account_id: Uuid) -> AppResult<Option<Credential>>;

    /// Atomically consumes an OTP, stores the credential, and marks the
    /// account activated. All-or-nothing.
    async fn activate_with_credential(
        &self,
        account_id: Uuid,
        otp_id: Uuid,
        hash: &str,
    ) -> AppResult<()>;
}

/// One-time code persistence.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Stores a new code digest for an account.
    async fn create(
        &self,
        account_id: Uuid,
        code_digest: &str,
        kind: OtpKind,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Otp>;

    /// Loads all unexpired codes of a kind, for digest matching.
    async fn active_by_kind(&self, kind: OtpKind, now: DateTime<Utc>) -> AppResult<Vec<Otp>>;
}
