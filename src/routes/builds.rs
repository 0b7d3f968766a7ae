//! Build sharing
//!
//! - POST /api/upload-build - store a build artifact publicly and return its URL

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rand::Rng;
use serde::Serialize;

use crate::error::{ErrorResponse, Result};
use crate::state::AppState;
use crate::storage::Visibility;
use crate::upload::read_form;

/// Key prefix of shared builds; the only prefix served publicly
pub const BUILDS_PREFIX: &str = "builds/";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload-build", post(upload_build))
}

#[derive(Debug, Serialize)]
struct UploadBuildResponse {
    url: String,
}

fn random_suffix(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect()
}

/// `builds/<millis>-<7 base36 chars>.<ext>`
fn build_key(extension: Option<&str>) -> String {
    let ext: String = extension
        .unwrap_or("bin")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let ext = if ext.is_empty() { "bin".to_string() } else { ext };
    format!(
        "{}{}-{}.{}",
        BUILDS_PREFIX,
        chrono::Utc::now().timestamp_millis(),
        random_suffix(7),
        ext
    )
}

/// POST /api/upload-build
async fn upload_build(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = read_form(multipart, state.max_upload()).await?;
    let Some(file) = form.first_file(&["file"]) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("No file provided")),
        )
            .into_response());
    };

    let key = build_key(file.extension().as_deref());
    let content_type = mime_guess::from_path(&key)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    match state
        .blobs()
        .put(&key, file.data.clone(), &content_type, Visibility::Public)
        .await
    {
        Ok(()) => {
            tracing::info!(key = %key, size = file.data.len(), "Stored build");
            Ok(Json(UploadBuildResponse {
                url: state.blobs().public_url(&key),
            })
            .into_response())
        }
        Err(e) => {
            tracing::error!(key = %key, "Build upload failed: {}", e);
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Upload failed")),
            )
                .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key_shape() {
        let key = build_key(Some("apk"));
        let rest = key.strip_prefix(BUILDS_PREFIX).unwrap();
        let (stamp, tail) = rest.split_once('-').unwrap();
        assert!(stamp.parse::<i64>().is_ok());
        let (suffix, ext) = tail.split_once('.').unwrap();
        assert_eq!(suffix.len(), 7);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
        assert_eq!(ext, "apk");
    }

    #[test]
    fn test_build_key_sanitizes_extension() {
        assert!(build_key(Some("../x")).ends_with(".x"));
        assert!(build_key(None).ends_with(".bin"));
    }
}
