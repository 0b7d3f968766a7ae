//! Route modules for the Toolbox server

pub mod blobs;
pub mod builds;
pub mod cron;
pub mod download;
pub mod feedback;
pub mod health;
pub mod images;
pub mod minify;
pub mod pdf;
pub mod tools;

use axum::{
    body::Body,
    extract::{FromRequest, Request},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

/// JSON request body whose rejections are reported as a 400 `{error}`
pub(crate) struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Binary response offered as a download
pub(crate) fn attachment(data: Vec<u8>, content_type: &str, file_name: &str) -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))
}

/// Run CPU-bound work on the blocking pool, mapping a join failure with `on_join`
pub(crate) async fn blocking<T, E, F>(work: F, on_join: fn(String) -> E) -> std::result::Result<T, E>
where
    F: FnOnce() -> std::result::Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| on_join(e.to_string()))?
}
