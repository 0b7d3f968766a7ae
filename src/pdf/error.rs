//! PDF error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    /// Input that is not a PDF, or a malformed request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("PDF operation failed: {0}")]
    Operation(String),

    #[error("DOCX assembly failed: {0}")]
    Docx(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Task join error: {0}")]
    Task(String),
}

impl PdfError {
    /// Whether the failure is caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PdfError::Parse(_) | PdfError::InvalidInput(_) | PdfError::InvalidRange(_)
        )
    }
}

impl From<mupdf::Error> for PdfError {
    fn from(e: mupdf::Error) -> Self {
        PdfError::Render(e.to_string())
    }
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Parse(e.to_string())
    }
}
