//! HTTP handlers. Thin by design: validate, delegate, wrap.

pub mod account;
pub mod health;
