//! Authorization orchestrator middleware.
//!
//! Order of checks for every request:
//! 1. public-route allow-list (short-circuits to an anonymous session),
//! 2. bearer token extraction and verification,
//! 3. domain resolution from grouping policy,
//! 4. policy enforcement over (subject, domain, path, method).
//!
//! On success the verified session and claims are attached to the
//! request extensions for downstream handlers.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use lifedrop_auth::rbac::PolicyEngine;
use lifedrop_auth::token::TokenVerifier;
use lifedrop_core::error::AppError;
use lifedrop_core::pattern::Pattern;
use lifedrop_core::result::AppResult;

use std::sync::Arc;

use crate::session::{RequestSession, SessionClaims};
use crate::state::AppState;

/// Composes the token verifier and policy engine at the request boundary.
///
/// Holds no state beyond its references and the compiled public-route
/// patterns.
#[derive(Debug)]
pub struct Authorizer {
    engine: Arc<PolicyEngine>,
    verifier: Arc<TokenVerifier>,
    public_patterns: Vec<Pattern>,
}

impl Authorizer {
    /// Creates an orchestrator with a public-route allow-list.
    pub fn new(
        engine: Arc<PolicyEngine>,
        verifier: Arc<TokenVerifier>,
        public_routes: &[&str],
    ) -> Self {
        Self {
            engine,
            verifier,
            public_patterns: public_routes.iter().copied().map(Pattern::new).collect(),
        }
    }

    /// Runs the full check sequence for one request.
    ///
    /// Returns the session and claims to attach, or the error to map to
    /// a 401/403 response.
    pub async fn check(
        &self,
        path: &str,
        method: &str,
        authorization: Option<&str>,
    ) -> AppResult<(RequestSession, Option<SessionClaims>)> {
        if self.public_patterns.iter().any(|p| p.matches(path)) {
            return Ok((RequestSession::anonymous(), None));
        }

        let header = authorization.ok_or_else(|| {
            warn!(method, path, "missing authorization header");
            AppError::authentication("missing authorization header")
        })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!(method, path, "invalid authorization header format");
            AppError::authentication("invalid authorization header")
        })?;

        let claims = self.verifier.verify(token).inspect_err(|_| {
            warn!(method, path, "token rejected");
        })?;

        let subject = claims.subject_id()?;

        let Some(domain) = self.engine.domain_for_subject(&claims.sub).await else {
            warn!(subject = %claims.sub, method, path, "no domain for subject");
            return Err(AppError::authorization("no domain for subject"));
        };

        if !self.engine.enforce(&claims.sub, &domain, path, method).await {
            warn!(subject = %claims.sub, domain, method, path, "permission denied");
            return Err(AppError::authorization("permission denied"));
        }

        Ok((
            RequestSession::authenticated(subject),
            Some(SessionClaims(claims)),
        ))
    }
}

/// Axum middleware wrapper over [`Authorizer::check`].
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();
    let method = request.method().as_str().to_string();
    let authorization = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let (session, claims) = state
        .authorizer
        .check(&path, &method, authorization.as_deref())
        .await?;

    request.extensions_mut().insert(session);
    if let Some(claims) = claims {
        request.extensions_mut().insert(claims);
    }

    Ok(next.run(request).await)
}
