//! Maps domain `AppError` to HTTP responses.
//!
//! The `IntoResponse for AppError` impl and the `ApiErrorResponse` body live
//! in `lifedrop-core` alongside `AppError` (coherence requires the impl to be
//! defined in the crate that owns the type). They are re-exported here so the
//! API layer can refer to them through `crate::error`.

pub use lifedrop_core::error::ApiErrorResponse;
