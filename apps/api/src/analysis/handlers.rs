//! Axum route handler for résumé analysis.
//!
//! `POST /analyze/` reads a multipart form (`file`, `role`) and runs the
//! request state machine in [`handle_analyze`]: type check, size check,
//! extraction, emptiness check, analysis. The first failure is terminal.
//!
//! The router lifts axum's body limit for this route. The `file` field is
//! streamed chunk by chunk and only buffered while it fits the configured
//! maximum, so an oversized upload is still measured in full without being
//! held in memory.

use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::QueryRejection,
        Multipart, Query, State,
    },
    Json,
};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::analysis::report::AnalysisReport;
use crate::errors::AppError;
use crate::extract::extract_text_blocking;
use crate::state::AppState;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
/// Cap for non-file form fields.
const MAX_TEXT_FIELD_BYTES: usize = 1024 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// An uploaded file as declared by the client. Lives for one request.
///
/// `size_bytes` is the full length of the field as received. `bytes` holds the
/// content only when that length is within the configured maximum, and is
/// empty otherwise.
#[derive(Debug)]
pub struct UploadedDocument {
    pub bytes: Bytes,
    pub content_type: String,
    pub size_bytes: usize,
}

impl UploadedDocument {
    pub fn new(content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            size_bytes: bytes.len(),
            bytes,
            content_type: content_type.into(),
        }
    }
}

#[derive(Debug)]
pub struct AnalyzeForm {
    pub file: UploadedDocument,
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    #[serde(default)]
    pub structured: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze/
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    query: Result<Query<AnalyzeParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let Query(params) = query.map_err(|e| {
        debug!("Rejected query string: {}", e.body_text());
        AppError::Validation("Invalid query string.".to_string())
    })?;
    let multipart = multipart.map_err(|e| {
        debug!("Rejected non-multipart request: {}", e.body_text());
        AppError::Validation("Expected a multipart/form-data body.".to_string())
    })?;

    let max_mb = state.config.max_file_size_mb;
    let form = read_analyze_form(multipart, state.config.max_file_size_bytes()).await?;
    info!(
        "Analyzing resume for role '{}' ({} bytes)",
        form.role, form.file.size_bytes
    );

    let analysis = handle_analyze(state.analyzer.as_ref(), max_mb, form.file, &form.role).await?;

    let report = params
        .structured
        .then(|| AnalysisReport::parse(&analysis));

    Ok(Json(AnalyzeResponse { analysis, report }))
}

/// Runs one analysis request to completion or to its first failure.
pub async fn handle_analyze(
    analyzer: &dyn ResumeAnalyzer,
    max_file_size_mb: u64,
    file: UploadedDocument,
    role: &str,
) -> Result<String, AppError> {
    ensure_pdf(&file.content_type)?;
    ensure_within_limit(file.size_bytes, max_file_size_mb)?;

    let text = extract_text_blocking(file.bytes).await?;
    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Could not extract any text from the PDF.".to_string(),
        ));
    }
    debug!("Extracted {} chars of resume text", text.len());

    let analysis = analyzer.analyze(&text, role).await?;
    Ok(analysis)
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

fn ensure_pdf(content_type: &str) -> Result<(), AppError> {
    if content_type != PDF_CONTENT_TYPE {
        return Err(AppError::Validation(
            "Only PDF files are supported.".to_string(),
        ));
    }
    Ok(())
}

fn ensure_within_limit(size_bytes: usize, max_file_size_mb: u64) -> Result<(), AppError> {
    let size_mb = size_bytes as f64 / BYTES_PER_MB;
    if size_mb > max_file_size_mb as f64 {
        return Err(AppError::PayloadTooLarge(format!(
            "File too large ({size_mb:.1} MB). Max is {max_file_size_mb} MB."
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart intake
// ────────────────────────────────────────────────────────────────────────────

async fn read_analyze_form(
    mut multipart: Multipart,
    max_file_size_bytes: usize,
) -> Result<AnalyzeForm, AppError> {
    let mut file: Option<UploadedDocument> = None;
    let mut role: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                // Fail before reading a body we would reject anyway.
                ensure_pdf(&content_type)?;
                file = Some(read_file_field(field, content_type, max_file_size_bytes).await?);
            }
            "role" => role = Some(read_text_field(field, "role").await?),
            other => debug!("Ignoring unexpected form field '{other}'"),
        }
    }

    let file = file.ok_or_else(|| missing_field("file"))?;
    let role = role.ok_or_else(|| missing_field("role"))?;
    Ok(AnalyzeForm { file, role })
}

/// Streams the file field, counting every byte but keeping only an upload
/// that stays within `max_bytes`.
async fn read_file_field(
    mut field: Field<'_>,
    content_type: String,
    max_bytes: usize,
) -> Result<UploadedDocument, AppError> {
    let mut buffer = BytesMut::new();
    let mut size_bytes: usize = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size_bytes = size_bytes.saturating_add(chunk.len());
        if size_bytes <= max_bytes {
            buffer.extend_from_slice(&chunk);
        } else if !buffer.is_empty() {
            buffer = BytesMut::new();
        }
    }

    if size_bytes > max_bytes {
        debug!("Discarded oversized upload after counting {size_bytes} bytes");
    }

    Ok(UploadedDocument {
        bytes: buffer.freeze(),
        content_type,
        size_bytes,
    })
}

async fn read_text_field(mut field: Field<'_>, name: &str) -> Result<String, AppError> {
    let mut buffer = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buffer.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::Validation(format!(
                "Form field '{name}' exceeds {} KB.",
                MAX_TEXT_FIELD_BYTES / 1024
            )));
        }
        buffer.extend_from_slice(&chunk);
    }
    String::from_utf8(buffer.to_vec())
        .map_err(|_| AppError::Validation(format!("Form field '{name}' is not valid UTF-8.")))
}

fn missing_field(name: &str) -> AppError {
    AppError::UnprocessableEntity(format!("Missing required form field: {name}"))
}

fn multipart_error(err: MultipartError) -> AppError {
    debug!("Malformed multipart body: {}", err.body_text());
    AppError::Validation("Invalid multipart form data.".to_string())
}
