//! Building a PDF from raster images, one page per image

use image::ImageFormat;
use lopdf::{dictionary, Document, Object};

use super::draw::{embed_image, image_operations};
use super::error::PdfError;

/// Page size in points equals the image size in pixels
pub fn images_to_pdf(images: &[Vec<u8>]) -> Result<Vec<u8>, PdfError> {
    if images.is_empty() {
        return Err(PdfError::InvalidInput("No images provided".into()));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(images.len());

    for (i, data) in images.iter().enumerate() {
        match image::guess_format(data) {
            Ok(ImageFormat::Png) | Ok(ImageFormat::Jpeg) => {}
            _ => {
                return Err(PdfError::InvalidInput(format!(
                    "Image {} is not a PNG or JPEG",
                    i + 1
                )))
            }
        }
        let img = image::load_from_memory(data)
            .map_err(|e| PdfError::Image(format!("Cannot decode image {}: {}", i + 1, e)))?;
        let (w, h) = (img.width() as f32, img.height() as f32);

        let xobject = embed_image(&mut doc, &img);
        let content = lopdf::content::Content {
            operations: image_operations("Im1", 0.0, 0.0, w, h),
        };
        let encoded = content
            .encode()
            .map_err(|e| PdfError::Operation(format!("Failed to encode content: {}", e)))?;
        let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Real(w), Object::Real(h)],
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im1" => xobject },
            },
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Operation(format!("Failed to save PDF: {}", e)))?;

    tracing::debug!(pages = count, size = buffer.len(), "Built PDF from images");
    Ok(buffer)
}
