//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `search`: free-text frame search

pub mod health;
pub mod search;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /, no authentication).
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Framesift Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/search",
            "/static/frames/",
            "/health"
        ]
    })))
}

/// 404 Not Found handler for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
