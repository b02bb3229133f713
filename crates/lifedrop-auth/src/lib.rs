//! # lifedrop-auth
//!
//! The trust and access-control core of the Lifedrop platform.
//!
//! ## Modules
//!
//! - `password` — Argon2id credential hashing with a server-wide pepper
//! - `token` — Ed25519-signed session token issuance and verification
//! - `ratelimit` — per-key token-bucket rate limiting with background eviction
//! - `rbac` — in-memory policy engine with role hierarchy and domain matching
//! - `random` — CSPRNG helpers for salts, opaque tokens, and one-time codes

pub mod password;
pub mod random;
pub mod ratelimit;
pub mod rbac;
pub mod token;

pub use password::CredentialHasher;
pub use ratelimit::{Decision, TokenBucket};
pub use rbac::{MemoryAdapter, PolicyAdapter, PolicyEngine, PolicyRule, RuleFilter, RuleType};
pub use token::{Claims, Keypair, TokenIssuer, TokenPair, TokenVerifier};
