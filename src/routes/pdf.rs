//! PDF Routes
//!
//! Every action answers `{success, url|urls, error?}`. Domain failures are
//! reported in the body with status 200; only an oversized upload changes
//! the status (413). Results are written to the temp directory and exposed
//! through `/api/download`.
//!
//! Endpoints:
//! - POST /api/pdf/to-word - PDF to DOCX
//! - POST /api/pdf/to-images - one PNG per page
//! - POST /api/pdf/merge - concatenate `file0..fileN`
//! - POST /api/pdf/split - one PDF per range
//! - POST /api/pdf/edit - draw text and images onto pages
//! - POST /api/pdf/from-images - one page per PNG/JPEG

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pdf::{
    self, PdfEdit, PdfError, ResolvedEdit, DEFAULT_FONT_SIZE, RENDER_SCALE,
};
use crate::state::AppState;
use crate::upload::{read_form, UploadForm};

use super::blocking;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pdf/to-word", post(to_word))
        .route("/api/pdf/to-images", post(to_images))
        .route("/api/pdf/merge", post(merge))
        .route("/api/pdf/split", post(split))
        .route("/api/pdf/edit", post(edit))
        .route("/api/pdf/from-images", post(from_images))
}

#[derive(Debug, Default, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    fn url(url: String) -> Self {
        Self {
            success: true,
            url: Some(url),
            ..Default::default()
        }
    }

    fn urls(urls: Vec<String>) -> Self {
        Self {
            success: true,
            urls: Some(urls),
            ..Default::default()
        }
    }
}

/// Fold a handler result into the action envelope
fn respond(action: &str, result: Result<ActionResponse>) -> Response {
    let err = match result {
        Ok(body) => return Json(body).into_response(),
        Err(err) => err,
    };

    let (status, message) = match &err {
        AppError::Upload(e) => (e.status_code(), e.to_string()),
        AppError::BadRequest(msg) => (StatusCode::OK, msg.clone()),
        AppError::Pdf(e) if e.is_client_error() => (StatusCode::OK, e.to_string()),
        other => {
            tracing::error!(action = action, "PDF action failed: {}", other);
            (StatusCode::OK, format!("Failed to {}", action))
        }
    };
    if status == StatusCode::OK {
        tracing::warn!(action = action, "PDF action rejected: {}", message);
    }

    (
        status,
        Json(ActionResponse {
            success: false,
            error: Some(message),
            ..Default::default()
        }),
    )
        .into_response()
}

/// The single input PDF of an action
fn input_pdf(form: &UploadForm) -> Result<Vec<u8>> {
    let file = form
        .first_file(&["file0", "file"])
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    if !pdf::is_pdf(&file.data, file.content_type.as_deref()) {
        return Err(AppError::BadRequest("Please upload a PDF file.".to_string()));
    }
    Ok(file.data.clone())
}

async fn persist(state: &AppState, prefix: &str, extension: &str, data: &[u8]) -> Result<String> {
    let path = state.temp_files().persist(prefix, extension, data).await?;
    Ok(state.temp_files().download_url(&path))
}

/// POST /api/pdf/to-word
async fn to_word(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result: Result<ActionResponse> = async {
        let form = read_form(multipart, state.max_upload()).await?;
        let bytes = input_pdf(&form)?;
        let docx = blocking(move || pdf::pdf_to_docx(&bytes), PdfError::Task).await?;
        Ok(ActionResponse::url(persist(&state, "converted", "docx", &docx).await?))
    }
    .await;
    respond("convert PDF to Word", result)
}

/// POST /api/pdf/to-images
async fn to_images(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result: Result<ActionResponse> = async {
        let form = read_form(multipart, state.max_upload()).await?;
        let bytes = input_pdf(&form)?;
        let pages = blocking(
            move || pdf::render_pages(&bytes, RENDER_SCALE),
            PdfError::Task,
        )
        .await?;

        let mut urls = Vec::with_capacity(pages.len());
        for page in &pages {
            let prefix = format!("page_{}", page.number);
            urls.push(persist(&state, &prefix, "png", &page.png).await?);
        }
        Ok(ActionResponse::urls(urls))
    }
    .await;
    respond("convert PDF to images", result)
}

/// POST /api/pdf/merge
async fn merge(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result: Result<ActionResponse> = async {
        let form = read_form(multipart, state.max_upload()).await?;
        let files = form.indexed_files();
        if files.len() < 2 {
            return Err(AppError::BadRequest(
                "At least two PDF files are required".to_string(),
            ));
        }
        if let Some(bad) = files
            .iter()
            .find(|f| !pdf::is_pdf(&f.data, f.content_type.as_deref()))
        {
            return Err(AppError::BadRequest(format!(
                "{} is not a PDF file",
                bad.file_name.as_deref().unwrap_or(&bad.field_name)
            )));
        }

        let documents: Vec<Vec<u8>> = files.iter().map(|f| f.data.clone()).collect();
        let merged = blocking(move || pdf::merge_documents(documents), PdfError::Task).await?;
        Ok(ActionResponse::url(persist(&state, "merged", "pdf", &merged).await?))
    }
    .await;
    respond("merge PDFs", result)
}

/// POST /api/pdf/split
async fn split(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result: Result<ActionResponse> = async {
        let form = read_form(multipart, state.max_upload()).await?;
        let bytes = input_pdf(&form)?;
        let ranges = match form.field("ranges").filter(|r| !r.trim().is_empty()) {
            Some(r) => Some(pdf::parse_ranges(r)?),
            None => None,
        };

        let parts = blocking(
            move || pdf::split_document(&bytes, ranges.as_deref()),
            PdfError::Task,
        )
        .await?;

        let mut urls = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let prefix = format!("split_{}", i + 1);
            urls.push(persist(&state, &prefix, "pdf", part).await?);
        }
        Ok(ActionResponse::urls(urls))
    }
    .await;
    respond("split PDF", result)
}

/// Legacy single-text edit position
#[derive(Debug, Deserialize)]
struct LegacyPosition {
    #[serde(default = "first_page")]
    page: u32,
    x: f32,
    y: f32,
}

fn first_page() -> u32 {
    1
}

/// Edits from the `edits` field, or from the legacy `text` + `position` pair.
/// Image edits name the form field holding their bytes.
fn resolve_edits(form: &UploadForm) -> Result<Vec<ResolvedEdit>> {
    let edits: Vec<PdfEdit> = match (form.field("edits"), form.field("text")) {
        (Some(raw), _) => serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid edits: {}", e)))?,
        (None, Some(text)) => {
            let position: LegacyPosition = form
                .field("position")
                .map(serde_json::from_str::<LegacyPosition>)
                .transpose()
                .map_err(|e| AppError::BadRequest(format!("Invalid position: {}", e)))?
                .unwrap_or(LegacyPosition {
                    page: 1,
                    x: 50.0,
                    y: 50.0,
                });
            vec![PdfEdit {
                page: position.page,
                text: Some(text.to_string()),
                x: position.x,
                y: position.y,
                size: Some(DEFAULT_FONT_SIZE),
                image: None,
            }]
        }
        (None, None) => Vec::new(),
    };

    edits
        .into_iter()
        .map(|edit| match edit.image.as_deref() {
            Some(field) => {
                let data = form
                    .first_file(&[field])
                    .map(|f| f.data.clone())
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("Missing image field '{}'", field))
                    })?;
                Ok(ResolvedEdit {
                    edit,
                    image: Some(data),
                })
            }
            None => Ok(ResolvedEdit::text(edit)),
        })
        .collect()
}

/// POST /api/pdf/edit
async fn edit(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result: Result<ActionResponse> = async {
        let form = read_form(multipart, state.max_upload()).await?;
        let bytes = input_pdf(&form)?;
        let edits = resolve_edits(&form)?;
        let edited = blocking(move || pdf::edit_document(&bytes, &edits), PdfError::Task).await?;
        Ok(ActionResponse::url(persist(&state, "edited", "pdf", &edited).await?))
    }
    .await;
    respond("edit PDF", result)
}

/// POST /api/pdf/from-images
async fn from_images(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result: Result<ActionResponse> = async {
        let form = read_form(multipart, state.max_upload()).await?;
        let images: Vec<Vec<u8>> = form.indexed_files().iter().map(|f| f.data.clone()).collect();
        if images.is_empty() {
            return Err(AppError::BadRequest("No images provided".to_string()));
        }
        let document = blocking(move || pdf::images_to_pdf(&images), PdfError::Task).await?;
        Ok(ActionResponse::url(persist(&state, "images", "pdf", &document).await?))
    }
    .await;
    respond("convert images to PDF", result)
}
