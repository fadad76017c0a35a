// ABOUTME: Liveness endpoint
// ABOUTME: Reports service name, version, and server time

use axum::{response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "status": "healthy",
            "service": "reqhub-api",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        },
        "message": null,
    }))
}
