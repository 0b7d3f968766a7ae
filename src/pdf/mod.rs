//! PDF processing
//!
//! MuPDF renders pages and extracts text; lopdf handles object-level work
//! (merge, split, drawing, image extraction); docx-rs assembles Word output.
//! Everything here is synchronous and CPU-bound, so handlers call it from
//! `spawn_blocking`.

mod docx;
mod draw;
mod edit;
mod error;
mod extract;
mod images_to_pdf;
mod merge;
mod render;
mod split;

pub use docx::pdf_to_docx;
pub use edit::{edit_document, PdfEdit, ResolvedEdit, DEFAULT_FONT_SIZE};
pub use error::PdfError;
pub use images_to_pdf::images_to_pdf;
pub use merge::merge_documents;
pub use render::{page_text_blocks, render_pages, RenderedPage, RENDER_SCALE};
pub use split::{parse_ranges, split_document, PageRange};

/// Declared as a PDF, or starting with the `%PDF` magic
pub fn is_pdf(bytes: &[u8], content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false)
        || bytes.starts_with(b"%PDF")
}
