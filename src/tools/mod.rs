//! Stateless text and data utilities behind `/api/tools/*`

pub mod base64;
pub mod color;
pub mod convert;
pub mod hash;
pub mod mock;
pub mod pattern;
pub mod qr;
pub mod secrets;
pub mod timestamp;
pub mod units;
pub mod url;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported {kind}: {value}")]
    Unsupported { kind: &'static str, value: String },
}

impl ToolError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ToolError::InvalidInput(msg.into())
    }

    pub fn unsupported(kind: &'static str, value: impl Into<String>) -> Self {
        ToolError::Unsupported {
            kind,
            value: value.into(),
        }
    }
}
