//! Resume upload: turns an uploaded file into plain text for question generation.
//!
//! PDFs go through `pdf-extract`. `.txt`, `.doc` and `.docx` uploads are read as UTF-8
//! text; anything that is not valid UTF-8 is rejected rather than guessed at.

pub mod handlers;

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx"];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not extract text: {0}")]
    Extraction(String),

    #[error("No selected file")]
    Empty,
}

/// Lowercased extension of `filename` if it is one we accept.
pub fn accepted_extension(filename: &str) -> Result<String, UploadError> {
    if filename.trim().is_empty() {
        return Err(UploadError::Empty);
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(UploadError::UnsupportedFormat(filename.to_string()))
    }
}

fn extract_text(extension: &str, bytes: &[u8]) -> Result<String, UploadError> {
    match extension {
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| UploadError::Extraction(format!("unreadable PDF: {e}"))),
        _ => String::from_utf8(bytes.to_vec())
            .map_err(|e| UploadError::Extraction(format!("file is not UTF-8 text: {e}"))),
    }
}

/// Extracts the text of an uploaded resume.
///
/// Extraction runs on the blocking pool; a panic inside the PDF parser is reported as an
/// extraction failure instead of taking the request down.
pub async fn extract_resume_text(filename: &str, bytes: Bytes) -> Result<String, UploadError> {
    let extension = accepted_extension(filename)?;
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }

    debug!("Extracting text from {filename} ({} bytes)", bytes.len());

    tokio::task::spawn_blocking(move || extract_text(&extension, &bytes))
        .await
        .map_err(|e| UploadError::Extraction(format!("extraction task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_extensions_are_case_insensitive() {
        assert_eq!(accepted_extension("cv.PDF").unwrap(), "pdf");
        assert_eq!(accepted_extension("my.resume.Docx").unwrap(), "docx");
        assert_eq!(accepted_extension("notes.txt").unwrap(), "txt");
    }

    #[test]
    fn test_unsupported_or_missing_extension_is_rejected() {
        assert!(matches!(
            accepted_extension("cv.exe"),
            Err(UploadError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            accepted_extension("resume"),
            Err(UploadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_filename_means_no_file() {
        assert!(matches!(accepted_extension(""), Err(UploadError::Empty)));
    }

    #[tokio::test]
    async fn test_text_upload_is_returned_verbatim() {
        let text = "Jane Doe\nBackend engineer, Rust and Kafka.";
        let extracted = extract_resume_text("resume.txt", Bytes::from(text)).await.unwrap();
        assert_eq!(extracted, text);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_an_extraction_error() {
        let bytes = Bytes::from_static(&[0xff, 0xfe, 0x00, 0x41]);
        let result = extract_resume_text("resume.docx", bytes).await;
        assert!(matches!(result, Err(UploadError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_an_extraction_error() {
        let bytes = Bytes::from_static(b"definitely not a pdf");
        let result = extract_resume_text("resume.pdf", bytes).await;
        assert!(matches!(result, Err(UploadError::Extraction(_))));
    }

    #[tokio::test]
    async fn test_zero_byte_upload_is_empty() {
        let result = extract_resume_text("resume.txt", Bytes::new()).await;
        assert!(matches!(result, Err(UploadError::Empty)));
    }
}
