//! Public blob reads for the local storage backend
//!
//! - GET /api/blobs/*key - serve a shared build

use axum::{
    extract::{Path, State},
    response::Response,
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;

use super::attachment;
use super::builds::BUILDS_PREFIX;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/blobs/*key", get(get_blob))
}

async fn get_blob(State(state): State<AppState>, Path(key): Path<String>) -> Result<Response> {
    // Everything outside the builds prefix is private
    if !key.starts_with(BUILDS_PREFIX) {
        return Err(AppError::NotFound("Object not found".to_string()));
    }

    let blob = state.blobs().get(&key).await?;
    let content_type = blob
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let file_name = key.rsplit('/').next().unwrap_or(&key);

    attachment(blob.data, content_type, file_name)
}
