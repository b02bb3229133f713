//! One-time code store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use lifedrop_core::error::{AppError, ErrorKind};
use lifedrop_core::result::AppResult;
use lifedrop_entity::otp::{Otp, OtpKind};
use lifedrop_service::store::OtpStore;

/// `OtpStore` backed by the `otps` table.
#[derive(Debug, Clone)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    /// Creates a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpStore for PgOtpStore {
    async fn create(
        &self,
        account_id: Uuid,
        code_digest: &str,
        kind: OtpKind,
        expires_at: DateTime<Utc>,
    ) -> AppResult<Otp> {
        sqlx::query_as::<_, Otp>(
            "INSERT INTO otps (id, account_id, code_digest, kind, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(code_digest)
        .bind(kind)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store code", e))
    }

    async fn active_by_kind(&self, kind: OtpKind, now: DateTime<Utc>) -> AppResult<Vec<Otp>> {
        sqlx::query_as::<_, Otp>(
            "SELECT * FROM otps WHERE kind = $1 AND expires_at > $2 ORDER BY created_at",
        )
        .bind(kind)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load codes", e))
    }
}
