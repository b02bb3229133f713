//! Account endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use lifedrop_auth::token::TokenPair;
use lifedrop_core::result::AppResult;
use lifedrop_service::account::Registration;

use crate::dto::request::{
    ActivateRequest, AuthorizeRequest, RegisterRequest, ResendOtpRequest, validated,
};
use crate::dto::response::{AccountResponse, ApiResponse, StatusMessage};
use crate::session::CurrentSession;
use crate::state::AppState;

/// `POST /auth/v1/authorize` — exchange credentials for a token pair.
pub async fn authorize(
    State(state): State<AppState>,
    Json(body): Json<AuthorizeRequest>,
) -> AppResult<Json<ApiResponse<TokenPair>>> {
    let body = validated(body)?;
    let pair = state
        .accounts
        .authorize(&body.email, &body.password, &body.platform)
        .await?;
    Ok(Json(ApiResponse::ok(pair)))
}

/// `POST /account/v1/register` — create an account and issue its
/// activation code.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<StatusMessage>>)> {
    let body = validated(body)?;
    state
        .accounts
        .register(Registration {
            email: body.email,
            full_name: body.full_name,
            gender: body.gender,
            national_id: body.national_id,
            country_iso_code: body.country_iso_code,
            dial_code: body.dial_code,
            phone_number: body.phone_number,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(StatusMessage::new("registered"))),
    ))
}

/// `POST /account/v1/activate` — redeem an activation code and set the
/// initial password.
pub async fn activate(
    State(state): State<AppState>,
    Json(body): Json<ActivateRequest>,
) -> AppResult<Json<ApiResponse<StatusMessage>>> {
    let body = validated(body)?;
    state.accounts.activate(&body.code, &body.password).await?;
    Ok(Json(ApiResponse::ok(StatusMessage::new("activated"))))
}

/// `POST /account/v1/otp/resend` — re-issue a one-time code.
pub async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<ResendOtpRequest>,
) -> AppResult<Json<ApiResponse<StatusMessage>>> {
    let body = validated(body)?;
    state.accounts.resend_otp(&body.email, body.kind).await?;
    Ok(Json(ApiResponse::ok(StatusMessage::new("code sent"))))
}

/// `GET /account/v1/self` — the caller's own profile.
pub async fn self_profile(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    let account = state.accounts.self_account(session.id).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}
