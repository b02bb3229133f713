//! Request-scoped session types attached by the authorization middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use lifedrop_auth::token::Claims;
use lifedrop_core::error::AppError;

/// The authenticated (or anonymous) caller for the current request.
#[derive(Debug, Clone)]
pub struct RequestSession {
    /// Subject account ID; nil for anonymous sessions.
    pub id: Uuid,
    /// Whether the request matched a public route without a token.
    pub anonymous: bool,
}

impl RequestSession {
    /// An anonymous session for public routes.
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::nil(),
            anonymous: true,
        }
    }

    /// A verified session for a subject.
    pub fn authenticated(id: Uuid) -> Self {
        Self {
            id,
            anonymous: false,
        }
    }
}

/// Verified token claims, available to handlers that need them.
#[derive(Debug, Clone)]
pub struct SessionClaims(pub Claims);

/// Extractor for the session attached by the authorization middleware.
///
/// Rejects with 401 when no session is present (the route was mounted
/// outside the middleware) or when the session is anonymous.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub RequestSession);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<RequestSession>()
            .cloned()
            .ok_or_else(|| AppError::authentication("no session"))?;

        if session.anonymous {
            return Err(AppError::authentication("authentication required"));
        }

        Ok(Self(session))
    }
}
