//! Drawing text and images onto existing PDF pages

use lopdf::Document;
use serde::Deserialize;

use super::draw::{
    add_page_resource, append_page_content, embed_image, embed_standard_font, image_operations,
    text_operations,
};
use super::error::PdfError;

/// Default font size for text edits
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// One edit placed on a page; coordinates are PDF points from the
/// bottom-left corner
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PdfEdit {
    /// 1-indexed page number
    pub page: u32,
    #[serde(default)]
    pub text: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub size: Option<f32>,
    /// Name of the form field holding the image bytes
    #[serde(default)]
    pub image: Option<String>,
}

/// An edit with its image bytes resolved
#[derive(Debug, Clone)]
pub struct ResolvedEdit {
    pub edit: PdfEdit,
    pub image: Option<Vec<u8>>,
}

impl ResolvedEdit {
    pub fn text(edit: PdfEdit) -> Self {
        Self { edit, image: None }
    }
}

/// Apply `edits` to a PDF and return the saved document
pub fn edit_document(bytes: &[u8], edits: &[ResolvedEdit]) -> Result<Vec<u8>, PdfError> {
    if edits.is_empty() {
        return Err(PdfError::InvalidInput("No edits provided".into()));
    }

    let mut doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    let page_count = pages.len() as u32;

    let mut font_id = None;

    for resolved in edits {
        let edit = &resolved.edit;
        let page_id = *pages.get(&edit.page).ok_or_else(|| {
            PdfError::InvalidRange(format!(
                "Page {} does not exist (document has {} pages)",
                edit.page, page_count
            ))
        })?;

        let mut operations = Vec::new();

        if let Some(text) = edit.text.as_deref().filter(|t| !t.is_empty()) {
            let font = *font_id.get_or_insert_with(|| embed_standard_font(&mut doc));
            let name = add_page_resource(&mut doc, page_id, "Font", "FEdit", font)?;
            let size = edit.size.filter(|s| *s > 0.0).unwrap_or(DEFAULT_FONT_SIZE);
            operations.extend(text_operations(&name, size, edit.x, edit.y, text));
        }

        if let Some(data) = &resolved.image {
            let img = image::load_from_memory(data)
                .map_err(|e| PdfError::Image(format!("Cannot decode edit image: {}", e)))?;
            let (w, h) = (img.width() as f32 / 2.0, img.height() as f32 / 2.0);
            let xobject = embed_image(&mut doc, &img);
            let name = add_page_resource(&mut doc, page_id, "XObject", "ImEdit", xobject)?;
            operations.extend(image_operations(&name, edit.x, edit.y, w, h));
        }

        if operations.is_empty() {
            tracing::debug!(page = edit.page, "Edit has neither text nor image, skipping");
            continue;
        }

        append_page_content(&mut doc, page_id, operations)?;
    }

    doc.compress();
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Operation(format!("Failed to save edited PDF: {}", e)))?;

    tracing::debug!(edits = edits.len(), size = buffer.len(), "Edited PDF");
    Ok(buffer)
}
