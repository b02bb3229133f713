//! Route definitions for the Lifedrop HTTP API.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Routes reachable without a session token.
///
/// Matched by the authorization orchestrator with the same glob matcher
/// used for policy resources.
pub const PUBLIC_ROUTES: &[&str] = &[
    "/health/*",
    "/auth/v1/*",
    "/account/v1/register",
    "/account/v1/activate",
    "/account/v1/otp/*",
];

/// Build the complete Axum router with all routes and middleware.
///
/// The rate limiter runs outermost, before any token handling; the
/// authorization orchestrator guards everything behind its public-route
/// allow-list.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health/v1/live", get(handlers::health::live))
        .route("/auth/v1/authorize", post(handlers::account::authorize))
        .route("/account/v1/register", post(handlers::account::register))
        .route("/account/v1/activate", post(handlers::account::activate))
        .route("/account/v1/otp/resend", post(handlers::account::resend_otp))
        .route("/account/v1/self", get(handlers::account::self_profile))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::authorize,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit_by_ip,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
