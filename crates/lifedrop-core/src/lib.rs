//! # lifedrop-core
//!
//! Core crate for the Lifedrop platform. Contains configuration schemas,
//! the glob-style pattern matcher used by the policy engine and the
//! authorization middleware, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Lifedrop crates.

pub mod config;
pub mod error;
pub mod pattern;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
