//! Imaging error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImagingError {
    /// Requested or detected format cannot be produced
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Input bytes are not a decodable image
    #[error("Invalid image: {0}")]
    Decode(String),

    /// Resize parameters out of range
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Image task failed: {0}")]
    Task(String),
}

impl ImagingError {
    /// Whether the caller sent something we cannot process
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImagingError::UnsupportedFormat(_)
                | ImagingError::Decode(_)
                | ImagingError::InvalidDimensions(_)
        )
    }
}
