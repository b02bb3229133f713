//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use lifedrop_auth::ratelimit::TokenBucket;
use lifedrop_auth::rbac::PolicyEngine;
use lifedrop_auth::token::TokenVerifier;
use lifedrop_service::AccountService;

use crate::middleware::auth::Authorizer;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authorization orchestrator (public routes, token check, enforcement).
    pub authorizer: Arc<Authorizer>,
    /// Policy decision engine.
    pub engine: Arc<PolicyEngine>,
    /// Per-IP rate limiter.
    pub limiter: Arc<TokenBucket>,
    /// Account flows.
    pub accounts: Arc<AccountService>,
}

impl AppState {
    /// Assembles the state from constructed components.
    pub fn new(
        engine: Arc<PolicyEngine>,
        verifier: Arc<TokenVerifier>,
        limiter: Arc<TokenBucket>,
        accounts: Arc<AccountService>,
        public_routes: &[&str],
    ) -> Self {
        let authorizer = Arc::new(Authorizer::new(
            Arc::clone(&engine),
            verifier,
            public_routes,
        ));

        Self {
            authorizer,
            engine,
            limiter,
            accounts,
        }
    }
}
