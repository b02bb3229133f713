//! Ed25519-signed session tokens.
//!
//! Tokens are compact, URL-safe strings signed with the asymmetric
//! EdDSA scheme; verification needs only the public half of the keypair.
//! Verification is a pure function of the token and the current time;
//! nothing is stored server-side.

pub mod claims;
pub mod issuer;
pub mod keypair;
pub mod verifier;

pub use claims::Claims;
pub use issuer::{CLOCK_SKEW_SECONDS, TokenIssuer, TokenPair};
pub use keypair::Keypair;
pub use verifier::TokenVerifier;
