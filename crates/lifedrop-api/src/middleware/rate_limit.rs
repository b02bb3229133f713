//! Per-IP rate-limit middleware.
//!
//! Every response carries the window metadata headers; a denial answers
//! 429 with a `Retry-After` hint and nothing else. The reason behind a
//! denial is never exposed.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use tracing::warn;

use lifedrop_auth::ratelimit::Decision;

use crate::error::ApiErrorResponse;
use crate::state::AppState;

const HEADER_LIMIT: &str = "x-ratelimit-limit";
const HEADER_REMAINING: &str = "x-ratelimit-remaining";
const HEADER_RESET: &str = "x-ratelimit-reset";
const HEADER_USED: &str = "x-ratelimit-used";
const HEADER_RETRY_AFTER: &str = "retry-after";

/// Admits or rejects the request based on the caller's IP budget.
pub async fn rate_limit_by_ip(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_ip(&request);
    let decision = state.limiter.allow(&key).await;

    if !decision.allowed {
        warn!(key, "rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiErrorResponse {
                error: "RATE_LIMITED".to_string(),
                message: "too many requests".to_string(),
            }),
        )
            .into_response();
        apply_headers(response.headers_mut(), &decision);
        set_header(
            response.headers_mut(),
            HEADER_RETRY_AFTER,
            decision.retry_after_seconds(Utc::now()),
        );
        return response;
    }

    let mut response = next.run(request).await;
    apply_headers(response.headers_mut(), &decision);
    response
}

/// Resolves the caller's IP: `x-forwarded-for` first, then the socket
/// peer address.
fn client_ip(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &Decision) {
    set_header(headers, HEADER_LIMIT, i64::from(decision.limit));
    set_header(headers, HEADER_REMAINING, i64::from(decision.remaining));
    set_header(headers, HEADER_RESET, decision.expiry.timestamp());
    set_header(headers, HEADER_USED, i64::from(decision.used));
}

fn set_header(headers: &mut HeaderMap, name: &'static str, value: i64) {
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}
