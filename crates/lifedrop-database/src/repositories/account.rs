//! Account and credential store implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use lifedrop_core::error::{AppError, ErrorKind};
use lifedrop_core::result::AppResult;
use lifedrop_entity::account::{Account, Credential};
use lifedrop_service::store::{AccountStore, NewAccount};

/// `AccountStore` backed by the `accounts` and `credentials` tables.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find account", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find account", e))
    }

    async fn create(&self, account: &NewAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts \
             (id, email, full_name, gender, national_id_digest, national_id_masked, \
              country_iso_code, dial_code, phone_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&account.email)
        .bind(&account.full_name)
        .bind(account.gender)
        .bind(&account.national_id_digest)
        .bind(&account.national_id_masked)
        .bind(&account.country_iso_code)
        .bind(&account.dial_code)
        .bind(&account.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                AppError::conflict("account already exists")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create account", e)
            }
        })
    }

    async fn credential_for(&self, account_id: Uuid) -> AppResult<Option<Credential>> {
        sqlx::query_as::<_, Credential>("SELECT * FROM credentials WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load credential", e))
    }

    async fn activate_with_credential(
        &self,
        account_id: Uuid,
        otp_id: Uuid,
        hash: &str,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let deleted = sqlx::query("DELETE FROM otps WHERE id = $1")
            .bind(otp_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to consume code", e))?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::conflict("code already redeemed"));
        }

        sqlx::query("INSERT INTO credentials (account_id, hash) VALUES ($1, $2)")
            .bind(account_id)
            .bind(hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to store credential", e)
            })?;

        sqlx::query("UPDATE accounts SET activated = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to activate account", e)
            })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit activation", e)
        })
    }
}
