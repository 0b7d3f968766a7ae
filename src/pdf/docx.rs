//! PDF to DOCX conversion
//!
//! Per page: one paragraph holding the page text, then each embedded image
//! at half its pixel size. Pages follow each other without breaks.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Pic, Run};
use image::DynamicImage;

use super::error::PdfError;
use super::extract::extract_page_images;
use super::render::page_text_blocks;

/// English Metric Units per CSS pixel
const EMU_PER_PIXEL: u32 = 9525;

fn png_bytes(img: &DynamicImage) -> Result<Vec<u8>, PdfError> {
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| PdfError::Image(e.to_string()))?;
    Ok(out)
}

fn image_paragraph(img: &DynamicImage) -> Result<Paragraph, PdfError> {
    let png = png_bytes(img)?;
    let width = (img.width() / 2).max(1) * EMU_PER_PIXEL;
    let height = (img.height() / 2).max(1) * EMU_PER_PIXEL;
    let pic = Pic::new(&png).size(width, height);
    Ok(Paragraph::new().add_run(Run::new().add_image(pic)))
}

/// Text blocks of one page joined by single spaces
fn page_paragraph_text(blocks: &[String]) -> String {
    blocks
        .iter()
        .map(|b| b.trim())
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a PDF to a DOCX document
pub fn pdf_to_docx(bytes: &[u8]) -> Result<Vec<u8>, PdfError> {
    let text = page_text_blocks(bytes)?;
    let lo_doc = lopdf::Document::load_mem(bytes)?;
    let images = extract_page_images(&lo_doc)?;

    let mut docx = Docx::new();
    let page_count = text.len();
    let mut image_count = 0;

    for (index, blocks) in text.iter().enumerate() {
        let page_text = page_paragraph_text(blocks);
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(page_text)));

        for img in images.get(index).into_iter().flatten() {
            docx = docx.add_paragraph(image_paragraph(img)?);
            image_count += 1;
        }
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| PdfError::Docx(e.to_string()))?;

    tracing::debug!(
        pages = page_count,
        images = image_count,
        "Converted PDF to DOCX"
    );
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::create_test_pdf;
    use std::io::Read;

    fn document_xml(docx: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn test_one_paragraph_per_page() {
        let pdf = create_test_pdf(2, "W");
        let docx = pdf_to_docx(&pdf).unwrap();
        let xml = document_xml(&docx);

        assert!(xml.contains("W-Page-1"));
        assert!(xml.contains("W-Page-2"));
        assert_eq!(xml.matches("<w:p>").count() + xml.matches("<w:p ").count(), 2);
        assert!(!xml.contains(r#"w:type="page""#));
    }

    #[test]
    fn test_page_text_joins_blocks() {
        let blocks = vec![" Title ".to_string(), String::new(), "Body\ntext".to_string()];
        assert_eq!(page_paragraph_text(&blocks), "Title Body\ntext");
        assert_eq!(page_paragraph_text(&[]), "");
    }

    #[test]
    fn test_rejects_non_pdf() {
        assert!(pdf_to_docx(b"hello").is_err());
    }
}
