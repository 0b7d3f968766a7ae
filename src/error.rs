//! Error types for the Toolbox server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::imaging::ImagingError;
use crate::minify::MinifyError;
use crate::pdf::PdfError;
use crate::tools::ToolError;
use crate::upload::UploadError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    #[error("Image error: {0}")]
    Imaging(#[from] ImagingError),

    #[error(transparent)]
    Minify(#[from] MinifyError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Blob backend failures
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("S3 connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("S3 SDK error: {0}")]
    SdkError(String),

    #[error("Local storage error: {0}")]
    Local(#[from] std::io::Error),
}

/// `{error}` body shared by every failing JSON endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Minify(_) | AppError::Tool(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Upload(e) => e.status_code(),
            AppError::Storage(StorageError::ObjectNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::AccessDenied(_)) => StatusCode::FORBIDDEN,
            AppError::Pdf(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Imaging(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller; server faults are not described
    fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::Storage(StorageError::ObjectNotFound(_)) => "Object not found".to_string(),
            AppError::Storage(StorageError::AccessDenied(_)) => "Access denied".to_string(),
            AppError::Storage(_) => "Storage error".to_string(),
            AppError::Pdf(e) if !e.is_client_error() => "PDF processing failed".to_string(),
            AppError::Imaging(e) if !e.is_client_error() => "Image processing failed".to_string(),
            AppError::Archive(_) => "Failed to build archive".to_string(),
            AppError::Internal(_) | AppError::Io(_) => "An internal error occurred".to_string(),
            AppError::Pdf(e) => e.to_string(),
            AppError::Imaging(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else if matches!(self, AppError::Upload(_)) {
            tracing::warn!("Upload rejected: {}", self);
        }

        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}
