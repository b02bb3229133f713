//! # lifedrop-api
//!
//! HTTP API layer for Lifedrop built on Axum.
//!
//! The authorization orchestrator and the rate-limit middleware guard
//! every route; handlers stay thin and delegate to `lifedrop-service`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod session;
pub mod state;

pub use router::build_router;
pub use state::AppState;
