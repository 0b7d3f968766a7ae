//! Generated file downloads
//!
//! - GET /api/download?file=<path> - stream a file from the temp directory

use axum::{
    extract::{Query, State},
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::temp_files::TempPathError;

use super::attachment;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/download", get(download))
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    file: Option<String>,
}

fn content_type_for(path: &std::path::Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("docx") => DOCX_MIME.to_string(),
        _ => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// GET /api/download
async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response> {
    let requested = query.file.unwrap_or_default();
    let path = state
        .temp_files()
        .resolve(&requested)
        .await
        .map_err(|e| match e {
            TempPathError::Invalid => {
                tracing::warn!(requested = %requested, "Rejected download path");
                AppError::BadRequest(e.to_string())
            }
            TempPathError::NotFound => AppError::NotFound(e.to_string()),
        })?;

    let data = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound("File not found".to_string()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download".to_string());

    attachment(data, &content_type_for(&path), &file_name)
}
