use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error.";
pub const INVALID_PDF_DETAIL: &str =
    "Could not read the PDF. The file is malformed or unsupported.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnprocessableEntity(_) | AppError::InvalidPdf(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Llm(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Validation(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::UnprocessableEntity(msg) => msg.clone(),
            AppError::InvalidPdf(msg) => {
                tracing::warn!("Rejected unparseable PDF: {msg}");
                INVALID_PDF_DETAIL.to_string()
            }
            AppError::Llm(e) => {
                tracing::error!("Unhandled error during resume analysis (LLM): {e}");
                INTERNAL_ERROR_DETAIL.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Unhandled error during resume analysis: {e:?}");
                INTERNAL_ERROR_DETAIL.to_string()
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
