//! Liveness endpoint.

use axum::Json;

use crate::dto::response::{ApiResponse, StatusMessage};

/// Always answers 200 while the process is serving.
pub async fn live() -> Json<ApiResponse<StatusMessage>> {
    Json(ApiResponse::ok(StatusMessage::new("alive")))
}
