//! Page rendering and text extraction through MuPDF

use std::io::Cursor;

use image::RgbImage;
use mupdf::{Colorspace, Document, Matrix, TextPageOptions};

use super::error::PdfError;

/// Scale pages are rasterised at
pub const RENDER_SCALE: f32 = 2.0;

const PDF_MIME: &str = "application/pdf";

#[derive(Debug)]
pub struct RenderedPage {
    /// 1-indexed
    pub number: usize,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Render every page to PNG
pub fn render_pages(bytes: &[u8], scale: f32) -> Result<Vec<RenderedPage>, PdfError> {
    let doc = Document::from_bytes(bytes, PDF_MIME)?;
    let page_count = doc.page_count()? as usize;

    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let page = doc.load_page(index as i32)?;
        // No alpha so pages come out on white
        let pixmap = page.to_pixmap(&matrix, &colorspace, false, true)?;
        let (png, width, height) = encode_pixmap(&pixmap)?;
        pages.push(RenderedPage {
            number: index + 1,
            png,
            width,
            height,
        });
    }

    tracing::debug!(pages = page_count, scale, "Rendered PDF pages");
    Ok(pages)
}

/// Text of every page, one string per text block
pub fn page_text_blocks(bytes: &[u8]) -> Result<Vec<Vec<String>>, PdfError> {
    let doc = Document::from_bytes(bytes, PDF_MIME)?;
    let page_count = doc.page_count()? as usize;

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let page = doc.load_page(index as i32)?;
        let text_page = page.to_text_page(TextPageOptions::empty())?;

        let mut blocks = Vec::new();
        for block in text_page.blocks() {
            let lines: Vec<String> = block
                .lines()
                .map(|line| line.chars().filter_map(|ch| ch.char()).collect::<String>())
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect();
            if !lines.is_empty() {
                blocks.push(lines.join(" "));
            }
        }
        pages.push(blocks);
    }

    Ok(pages)
}

/// PNG of an opaque RGB pixmap; rows may carry padding beyond `width * n`
fn encode_pixmap(pixmap: &mupdf::Pixmap) -> Result<(Vec<u8>, u32, u32), PdfError> {
    let (width, height) = (pixmap.width() as u32, pixmap.height() as u32);
    let channels = pixmap.n() as usize;
    if channels < 3 || width == 0 || height == 0 {
        return Err(PdfError::Image(format!(
            "Unexpected pixmap layout: {}x{} with {} channels",
            width, height, channels
        )));
    }
    let stride = pixmap.samples().len() / height as usize;

    let rgb: Vec<u8> = pixmap
        .samples()
        .chunks(stride)
        .flat_map(|row| {
            row[..width as usize * channels]
                .chunks_exact(channels)
                .flat_map(|px| [px[0], px[1], px[2]])
        })
        .collect();
    let img = RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| PdfError::Image("Pixmap size mismatch".into()))?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| PdfError::Image(e.to_string()))?;
    Ok((png, width, height))
}
