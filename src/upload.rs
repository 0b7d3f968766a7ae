//! Multipart upload intake
//!
//! Every handler reads its form through [`read_form`], which enforces the
//! per-file size cap while streaming so an oversized upload is rejected
//! before anything reaches disk.

use std::collections::HashMap;

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use thiserror::Error;

/// Upload errors
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File too large: {size} bytes exceeds the {}MB limit", .max / (1024 * 1024))]
    FileTooLarge { size: usize, max: usize },

    #[error("Request body exceeds the upload limit")]
    RequestTooLarge,

    #[error("Failed to read upload: {0}")]
    Multipart(String),

    #[error("Field '{0}' is not valid UTF-8 text")]
    InvalidText(String),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::FileTooLarge { .. } | UploadError::RequestTooLarge => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<MultipartError> for UploadError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::RequestTooLarge
        } else {
            UploadError::Multipart(e.body_text())
        }
    }
}

/// A file part of a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// File name without its extension, falling back to the field name
    pub fn stem(&self) -> String {
        let name = self.file_name.as_deref().unwrap_or(&self.field_name);
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        }
    }

    /// Lowercased extension of the client-side file name
    pub fn extension(&self) -> Option<String> {
        self.file_name
            .as_deref()
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// A fully read multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    /// All files submitted under `name`, in upload order
    pub fn files_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UploadedFile> + 'a {
        self.files.iter().filter(move |f| f.field_name == name)
    }

    /// First file submitted under any of `names`
    pub fn first_file(&self, names: &[&str]) -> Option<&UploadedFile> {
        names
            .iter()
            .find_map(|name| self.files.iter().find(|f| f.field_name == *name))
    }

    /// Files under `file0..fileN` ordered by index, or under `file` when no
    /// numbered field is present
    pub fn indexed_files(&self) -> Vec<&UploadedFile> {
        let mut numbered: Vec<(usize, &UploadedFile)> = self
            .files
            .iter()
            .filter_map(|f| {
                f.field_name
                    .strip_prefix("file")
                    .and_then(|n| n.parse::<usize>().ok())
                    .map(|n| (n, f))
            })
            .collect();

        if numbered.is_empty() {
            return self.files_named("file").collect();
        }

        numbered.sort_by_key(|(n, _)| *n);
        numbered.into_iter().map(|(_, f)| f).collect()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }
}

/// Read one field, failing as soon as it grows past `max` bytes
pub async fn read_limited(field: &mut Field<'_>, max: usize) -> Result<Vec<u8>, UploadError> {
    let mut data = Vec::new();

    while let Some(chunk) = field.chunk().await? {
        let size = data.len() + chunk.len();
        if size > max {
            return Err(UploadError::FileTooLarge { size, max });
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data)
}

/// Read every field of a multipart form. Parts with a file name become
/// [`UploadedFile`]s, the rest are text fields.
pub async fn read_form(mut multipart: Multipart, max: usize) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(|s| s.to_string());
        let content_type = field.content_type().map(|s| s.to_string());

        let data = read_limited(&mut field, max).await.map_err(|e| {
            tracing::warn!(field = %name, file_name = ?file_name, "Upload rejected: {}", e);
            e
        })?;

        match file_name {
            Some(file_name) => {
                tracing::debug!(
                    field = %name,
                    file_name = %file_name,
                    size = data.len(),
                    "Received file"
                );
                form.files.push(UploadedFile {
                    field_name: name,
                    file_name: Some(file_name),
                    content_type,
                    data,
                });
            }
            None => {
                let text =
                    String::from_utf8(data).map_err(|_| UploadError::InvalidText(name.clone()))?;
                form.fields.insert(name, text);
            }
        }
    }

    Ok(form)
}

/// Replace everything outside `[A-Za-z0-9_-]` with `_` and cap at 50 chars
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(50)
        .collect()
}
