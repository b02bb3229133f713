//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lifedrop_entity::account::Account;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    /// Human-readable status.
    pub message: String,
}

impl StatusMessage {
    /// Creates a status message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Account summary for responses; never exposes digests or hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub national_id_masked: String,
    pub country_iso_code: String,
    pub activated: bool,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            full_name: account.full_name,
            national_id_masked: account.national_id_masked,
            country_iso_code: account.country_iso_code,
            activated: account.activated,
        }
    }
}
