//! Session token issuance.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use lifedrop_core::config::token::TokenConfig;
use lifedrop_core::error::AppError;
use lifedrop_core::result::AppResult;

use crate::random;

use super::claims::Claims;
use super::keypair::Keypair;

/// Issued-at and not-before are backdated by this many seconds to
/// tolerate clock drift between the signer and any verifier.
pub const CLOCK_SKEW_SECONDS: i64 = 30;

/// A freshly issued access token with its companion refresh token.
///
/// The refresh token is an opaque high-entropy random string with no
/// cryptographic relation to the signed access token; its persistence
/// and rotation are handled outside this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Signed access token.
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// Access token expiration as epoch milliseconds.
    pub expires_in: i64,
}

/// Signs session tokens with the private half of the process keypair.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keypair: Arc<Keypair>,
    audience: String,
    issuer: String,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from the loaded keypair and token configuration.
    pub fn new(keypair: Arc<Keypair>, config: &TokenConfig) -> Self {
        Self {
            keypair,
            audience: config.audience.clone(),
            issuer: config.issuer.clone(),
            ttl: Duration::minutes(config.ttl_minutes as i64),
        }
    }

    /// Issues a signed access token and companion refresh token.
    pub fn issue(&self, subject: Uuid, platform: &str) -> AppResult<TokenPair> {
        let now = Utc::now();
        let backdated = now - Duration::seconds(CLOCK_SKEW_SECONDS);
        let expires_at = now + self.ttl;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            aud: self.audience.clone(),
            exp: expires_at.timestamp(),
            nbf: backdated.timestamp(),
            iat: backdated.timestamp(),
            jti: Uuid::new_v4().to_string(),
            platform: platform.to_string(),
        };

        let access_token = encode(
            &Header::new(Algorithm::EdDSA),
            &claims,
            self.keypair.encoding_key(),
        )
        .map_err(|e| AppError::internal(format!("failed to sign token: {e}")))?;

        Ok(TokenPair {
            access_token,
            refresh_token: random::rand_token(),
            expires_in: expires_at.timestamp_millis(),
        })
    }
}
