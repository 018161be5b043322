//! Text extraction for uploaded candidate documents.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
/// Per-file upload limit.
pub const MAX_PDF_BYTES: usize = 5 * 1024 * 1024;

/// Checks the declared type and size of an uploaded PDF before parsing it.
pub fn validate_pdf_upload(
    field: &str,
    content_type: Option<&str>,
    len: usize,
) -> Result<(), AppError> {
    if content_type != Some(PDF_CONTENT_TYPE) {
        return Err(AppError::Validation(format!(
            "{field} must be uploaded as {PDF_CONTENT_TYPE}, got {}",
            content_type.unwrap_or("no content type")
        )));
    }
    if len == 0 {
        return Err(AppError::Validation(format!("{field} is an empty file")));
    }
    if len > MAX_PDF_BYTES {
        return Err(AppError::Validation(format!(
            "{field} exceeds the {} MiB limit",
            MAX_PDF_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Extracts plain text from a PDF held in memory.
///
/// Parsing is CPU-bound and runs on the blocking pool. A document that cannot be
/// parsed, or that has no text layer, is an `UnprocessableEntity`.
pub async fn extract_pdf_text(field: &str, data: Bytes) -> Result<String, AppError> {
    let size = data.len();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("could not read {field} PDF: {e}")))?;

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "{field} PDF contains no extractable text"
        )));
    }

    debug!(field, size, chars = text.len(), "Extracted PDF text");
    Ok(text)
}
