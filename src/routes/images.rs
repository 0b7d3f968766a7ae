//! Image Routes
//!
//! Endpoints:
//! - POST /api/compress-images - Re-encode and resize uploaded images
//! - POST /api/generate-icons - iOS and Android icon set as a ZIP

use axum::{
    extract::{Multipart, State},
    response::Response,
    routing::post,
    Router,
};

use crate::archive::ZipBundle;
use crate::error::{AppError, Result};
use crate::imaging::{self, CompressOptions, ImagingError, OutputFormat};
use crate::state::AppState;
use crate::upload::{read_form, sanitize_file_name, UploadForm, UploadedFile};

use super::{attachment, blocking};

const DEFAULT_QUALITY: u8 = 80;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/compress-images", post(compress_images))
        .route("/api/generate-icons", post(generate_icons))
}

/// A boolean field is set only by the literal `true`; absent fields take `default`
fn flag(form: &UploadForm, name: &str, default: bool) -> bool {
    form.field(name)
        .map(|v| v.trim() == "true")
        .unwrap_or(default)
}

fn dimension(form: &UploadForm, name: &str) -> Option<u32> {
    form.field(name)
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
}

/// Read compression options from the form. An unparsable quality falls back
/// to the default; an unknown output format is rejected.
fn compress_options(form: &UploadForm) -> Result<CompressOptions> {
    let quality = form
        .field("quality")
        .and_then(|q| q.trim().parse::<i64>().ok())
        .map(|q| q.clamp(1, 100) as u8)
        .unwrap_or(DEFAULT_QUALITY);

    let format = match form.field("outputFormat").filter(|f| !f.trim().is_empty()) {
        Some(f) => f.parse::<OutputFormat>()?,
        None => OutputFormat::Webp,
    };

    Ok(CompressOptions {
        quality,
        format,
        width: dimension(form, "width"),
        height: dimension(form, "height"),
        maintain_aspect: flag(form, "maintainAspect", false),
        without_enlargement: flag(form, "withoutEnlargement", true),
    })
}

/// POST /api/compress-images
///
/// One image comes back as is; several are bundled in `compressed-images.zip`.
async fn compress_images(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = read_form(multipart, state.max_upload()).await?;
    let images: Vec<UploadedFile> = form.files_named("images").cloned().collect();
    if images.is_empty() {
        return Err(AppError::BadRequest("No images provided".to_string()));
    }
    let opts = compress_options(&form)?;
    let count = images.len();

    let outputs = blocking(
        move || {
            images
                .iter()
                .map(|file| {
                    let compressed = imaging::compress_image(&file.data, &opts)?;
                    let name = format!(
                        "compressed_{}.{}",
                        sanitize_file_name(&file.stem()),
                        compressed.format.extension()
                    );
                    Ok((name, compressed))
                })
                .collect::<std::result::Result<Vec<_>, ImagingError>>()
        },
        ImagingError::Task,
    )
    .await?;

    tracing::info!(count = count, "Compressed images");

    if let [(name, image)] = outputs.as_slice() {
        return attachment(image.data.clone(), image.format.mime_type(), name);
    }

    let mut bundle = ZipBundle::new();
    for (name, image) in &outputs {
        bundle.add(name, &image.data)?;
    }
    attachment(bundle.finish()?, "application/zip", "compressed-images.zip")
}

/// POST /api/generate-icons
async fn generate_icons(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = read_form(multipart, state.max_upload()).await?;
    let source = form
        .first_file(&["icon"])
        .map(|f| f.data.clone())
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let icons = blocking(move || imaging::generate_icons(&source), ImagingError::Task).await?;

    let mut bundle = ZipBundle::new();
    for icon in &icons {
        bundle.add(&icon.path, &icon.data)?;
    }

    tracing::info!(count = icons.len(), "Generated icon set");
    attachment(bundle.finish()?, "application/zip", "app-icons.zip")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> UploadForm {
        UploadForm {
            files: Vec::new(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_flags_default_when_absent() {
        let opts = compress_options(&form(&[])).unwrap();
        assert!(!opts.maintain_aspect);
        assert!(opts.without_enlargement);
        assert_eq!(opts.quality, DEFAULT_QUALITY);
        assert_eq!(opts.format, OutputFormat::Webp);
    }

    #[test]
    fn test_only_literal_true_sets_a_flag() {
        for value in ["yes", "1", "", "TRUE ", "False"] {
            let opts = compress_options(&form(&[("maintainAspect", value)])).unwrap();
            assert!(!opts.maintain_aspect, "{:?}", value);
        }
        let opts = compress_options(&form(&[
            ("maintainAspect", " true "),
            ("withoutEnlargement", "false"),
        ]))
        .unwrap();
        assert!(opts.maintain_aspect);
        assert!(!opts.without_enlargement);
    }
}
