//! In-memory store for tests and seed tooling.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;
use lifedrop_entity::account::{Account, Credential};
use lifedrop_entity::otp::{Otp, OtpKind};

use super::{AccountStore, NewAccount, OtpStore};

/// An `AccountStore` + `OtpStore` backed by in-memory vectors.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<Vec<Account>>,
    credentials: Mutex<Vec<Credential>>,
    otps: Mutex<Vec<Otp>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn create(&self, account: &NewAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.lock().await;
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AppError::conflict("account already exists"));
        }

        let created = Account {
            id: Uuid::new_v4(),
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            gender: account.gender,
            national_id_digest: account.national_id_digest.clone(),
            national_id_masked: account.national_id_masked.clone(),
            country_iso_code: account.country_iso_code.clone(),
            dial_code: account.dial_code.clone(),
            phone_number: account.phone_number.clone(),
            activated: false,
            locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn credential_for(&self, account_id: Uuid) -> AppResult<Option<Credential>> {
        Ok(self
            .credentials
            .lock()
            .await
            .iter()
            .find(|c| c.account_id == account_id)
            .cloned())
    }

    async fn activate_with_credential(
        &self,
        account_id: Uuid,
        otp_id: Uuid,
        hash: &str,
    ) -> AppResult<()> {
        let mut otps = self.otps.lock().await;
        let before = otps.len();
        otps.retain(|o| o.id != otp_id);
        if otps.len() == before {
            return Err(AppError::conflict("code already redeemed"));
        }

        self.credentials.lock().await.push(Credential {
            account_id,
            hash: hash.to_string(),
            created_at: Utc::now(),
        });
        for account in self.accounts.lock().await.iter_mut() {
            if account.id == account_id {
                account.activated = true;
                account.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OtpStore for MemoryStore {
    async fn create(
        &self,
        account_id: Uuid,
        code_digest: &str,
        kind: OtpKind,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Otp> {
        let otp = Otp {
            id: Uuid::new_v4(),
            account_id,
            code_digest: code_digest.to_string(),
            kind,
            expires_at,
            created_at: Utc::now(),
        };
        self.otps.lock().await.push(otp.clone());
        Ok(otp)
    }

    async fn active_by_kind(&self, kind: OtpKind, now: DateTime<Utc>) -> AppResult<Vec<Otp>> {
        Ok(self
            .otps
            .lock()
            .await
            .iter()
            .filter(|o| o.kind == kind && !o.is_expired(now))
            .cloned()
            .collect())
    }
}
