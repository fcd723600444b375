//! PDF text extraction for uploaded résumés.
//!
//! `pdf_extract` can panic on malformed input instead of returning an error, so
//! every call goes through [`std::panic::catch_unwind`]. The process-wide
//! panic hook still runs first and prints its own `thread panicked at` line to
//! stderr, outside `tracing`; the `warn!` emitted here for the same document
//! follows it. Parsing is CPU-bound; async callers use
//! [`extract_text_blocking`] to keep it off the executor.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("PDF extraction panicked (malformed document)")]
    Panicked,
}

/// Extracts the text of every page, in document order, concatenated with no
/// separator. Pages without extractable text contribute an empty segment.
pub fn extract_text(data: &[u8]) -> Result<String, ExtractError> {
    let pages = extract_pages(data)?;
    debug!("Extracted text from {} PDF page(s)", pages.len());
    Ok(pages.concat())
}

fn extract_pages(data: &[u8]) -> Result<Vec<String>, ExtractError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractError::Parse(e.to_string())),
        Err(payload) => {
            warn!(
                "PDF extraction panicked on a {} byte upload: {}",
                data.len(),
                panic_message(payload.as_ref())
            );
            Err(ExtractError::Panicked)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Runs [`extract_text`] on the blocking pool.
pub async fn extract_text_blocking(data: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_text(&data))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
        })?
        .map_err(|e| AppError::InvalidPdf(e.to_string()))
}
