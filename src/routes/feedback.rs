//! Feedback intake
//!
//! - POST /api/feedback - `{type, description, email?}` to `{success}`

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::feedback::FeedbackKind;
use crate::state::AppState;

use super::JsonBody;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/feedback", post(submit_feedback))
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: String,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct FeedbackResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// POST /api/feedback
async fn submit_feedback(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<FeedbackRequest>,
) -> Json<FeedbackResponse> {
    let result = match request.kind.parse::<FeedbackKind>() {
        Ok(kind) => {
            state
                .feedback()
                .submit(kind, &request.description, request.email.as_deref())
                .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => Json(FeedbackResponse {
            success: true,
            error: None,
        }),
        Err(e) => {
            tracing::warn!("Feedback submission failed: {}", e);
            Json(FeedbackResponse {
                success: false,
                error: Some("Failed to submit feedback".to_string()),
            })
        }
    }
}
