use axum::Json;
use serde_json::{json, Value};

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "AI Resume Analyzer Backend Running"
    }))
}

/// GET /health
/// Lightweight probe for deployment platforms.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
