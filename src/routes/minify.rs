//! Minification Routes
//!
//! Endpoints:
//! - POST /api/minify-css - `{css, beautify}` to `{minified}`
//! - POST /api/minify-js - `{js, beautify}` to `{minified}`
//! - POST /api/minify-html - `{html, beautify}` to `{minified}`
//!
//! A body that is not a JSON object with a non-empty string is a 400.

use axum::{extract::rejection::JsonRejection, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::minify::{
    beautify_css, beautify_js, minify_css, minify_html, minify_js, HtmlOptions, ScriptKind,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/minify-css", post(minify_css_handler))
        .route("/api/minify-js", post(minify_js_handler))
        .route("/api/minify-html", post(minify_html_handler))
}

#[derive(Debug, Deserialize)]
struct CssRequest {
    css: Option<String>,
    #[serde(default)]
    beautify: bool,
}

#[derive(Debug, Deserialize)]
struct JsRequest {
    js: Option<String>,
    #[serde(default)]
    beautify: bool,
}

#[derive(Debug, Deserialize)]
struct HtmlRequest {
    html: Option<String>,
    #[serde(default)]
    beautify: bool,
}

#[derive(Debug, Serialize)]
struct MinifyResponse {
    minified: String,
}

/// Source text and beautify flag, or a 400 carrying `missing`
fn source<T>(
    payload: std::result::Result<Json<T>, JsonRejection>,
    content: impl FnOnce(T) -> (Option<String>, bool),
    missing: &str,
) -> Result<(String, bool)> {
    let (text, beautify) = match payload {
        Ok(Json(request)) => content(request),
        Err(rejection) => {
            tracing::debug!("Rejected minify body: {}", rejection.body_text());
            (None, false)
        }
    };
    text.filter(|t| !t.is_empty())
        .map(|t| (t, beautify))
        .ok_or_else(|| AppError::BadRequest(missing.to_string()))
}

async fn minify_css_handler(
    payload: std::result::Result<Json<CssRequest>, JsonRejection>,
) -> Result<Json<MinifyResponse>> {
    let (css, beautify) = source(
        payload,
        |r| (r.css, r.beautify),
        "Invalid or missing CSS content",
    )?;

    let minified = if beautify {
        beautify_css(&css)?
    } else {
        minify_css(&css)?
    };
    Ok(Json(MinifyResponse { minified }))
}

async fn minify_js_handler(
    payload: std::result::Result<Json<JsRequest>, JsonRejection>,
) -> Result<Json<MinifyResponse>> {
    let (js, beautify) = source(
        payload,
        |r| (r.js, r.beautify),
        "Invalid or missing JavaScript content",
    )?;

    let minified = if beautify {
        beautify_js(&js)?
    } else {
        minify_js(&js, ScriptKind::Classic)?
    };
    Ok(Json(MinifyResponse { minified }))
}

async fn minify_html_handler(
    payload: std::result::Result<Json<HtmlRequest>, JsonRejection>,
) -> Result<Json<MinifyResponse>> {
    let (html, beautify) = source(
        payload,
        |r| (r.html, r.beautify),
        "Invalid or missing HTML content",
    )?;

    let opts = if beautify {
        HtmlOptions::beautify()
    } else {
        HtmlOptions::minify()
    };
    let minified = minify_html(&html, opts)?;
    Ok(Json(MinifyResponse { minified }))
}
