//! Scheduled jobs
//!
//! - GET /api/cron/sync-sheets - move queued feedback into the spreadsheet

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::error::{AppError, ErrorResponse};
use crate::feedback::SyncOutcome;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/cron/sync-sheets", get(sync_sheets))
}

/// `Authorization: Bearer <secret>`; without a configured secret nothing passes
fn authorized(headers: &HeaderMap, secret: Option<&str>) -> bool {
    let Some(secret) = secret else {
        return false;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token == secret)
        .unwrap_or(false)
}

/// GET /api/cron/sync-sheets
async fn sync_sheets(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !authorized(&headers, state.config().cron.secret.as_deref()) {
        tracing::warn!("Rejected unauthorized cron request");
        return AppError::Unauthorized.into_response();
    }

    match state.feedback().sync(state.sheets()).await {
        Ok(SyncOutcome::Empty) => Json(json!({ "message": "No data to sync" })).into_response(),
        Ok(SyncOutcome::Synced(count)) => Json(json!({ "synced": count })).into_response(),
        Err(e) => {
            tracing::error!("Sync failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Sync failed")),
            )
                .into_response()
        }
    }
}
