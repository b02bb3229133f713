//! Per-key token-bucket rate limiting.

pub mod bucket;

pub use bucket::{Decision, TokenBucket};
