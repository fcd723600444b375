use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::analysis::handlers::PDF_CONTENT_TYPE;
use crate::llm_client::MODEL;
use crate::state::AppState;

/// GET /docs
/// Machine-readable description of the HTTP surface. Only routed when DEBUG=true.
pub async fn docs_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "title": "AI Resume Analyzer",
        "version": env!("CARGO_PKG_VERSION"),
        "model": MODEL,
        "routes": [
            {
                "method": "GET",
                "path": "/",
                "responses": { "200": { "status": "ok", "message": "string" } }
            },
            {
                "method": "GET",
                "path": "/health",
                "responses": { "200": { "status": "healthy" } }
            },
            {
                "method": "POST",
                "path": "/analyze/",
                "content_type": "multipart/form-data",
                "form": {
                    "file": format!("{PDF_CONTENT_TYPE}, at most {} MB", state.config.max_file_size_mb),
                    "role": "target job role, free text"
                },
                "query": { "structured": "bool, adds a parsed `report` to the response" },
                "responses": {
                    "200": { "analysis": "string" },
                    "400": "non-PDF upload or malformed form",
                    "413": "upload over the size limit",
                    "422": "missing field, unreadable PDF or no extractable text",
                    "500": "upstream or unexpected failure"
                }
            }
        ]
    }))
}
