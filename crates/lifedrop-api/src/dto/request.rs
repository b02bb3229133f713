//! Request DTOs.

use serde::Deserialize;
use validator::Validate;

use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;
use lifedrop_entity::account::Gender;
use lifedrop_entity::otp::OtpKind;

/// Credential authentication request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuthorizeRequest {
    /// Account email.
    #[validate(email)]
    pub email: String,
    /// Plaintext password, verified against the stored hash.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Client platform tag.
    #[validate(length(min = 1, max = 32))]
    pub platform: String,
}

/// Account registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 164))]
    pub full_name: String,
    pub gender: Gender,
    #[validate(length(min = 8, max = 32))]
    pub national_id: String,
    #[validate(length(equal = 2))]
    pub country_iso_code: String,
    #[validate(length(min = 1, max = 8))]
    pub dial_code: String,
    #[validate(length(min = 4, max = 20))]
    pub phone_number: String,
}

/// OTP activation request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivateRequest {
    /// One-time code from the activation email.
    #[validate(length(equal = 6))]
    pub code: String,
    /// Initial password to set.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// OTP re-issue request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResendOtpRequest {
    #[validate(email)]
    pub email: String,
    pub kind: OtpKind,
}

/// Runs validator rules, mapping failures to a 400.
pub fn validated<T: Validate>(request: T) -> AppResult<T> {
    request
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(request)
}
