//! Embedded raster image extraction
//!
//! Walks each page's image XObjects and decodes them according to their
//! filter and colour space. Streams that cannot be decoded faithfully
//! (JPEG 2000, indexed palettes, unusual bit depths) are skipped with a
//! warning rather than emitted as garbage.

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Document, Object, Stream};

use super::draw::effective_resources;
use super::error::PdfError;

/// Colour model of raw (non-DCT) image samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorModel {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorModel {
    fn from_components(n: i64) -> Option<Self> {
        match n {
            1 => Some(ColorModel::Gray),
            3 => Some(ColorModel::Rgb),
            4 => Some(ColorModel::Cmyk),
            _ => None,
        }
    }

    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"DeviceGray" | b"G" | b"CalGray" => Some(ColorModel::Gray),
            b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(ColorModel::Rgb),
            b"DeviceCMYK" | b"CMYK" => Some(ColorModel::Cmyk),
            _ => None,
        }
    }

    fn channels(self) -> usize {
        match self {
            ColorModel::Gray => 1,
            ColorModel::Rgb => 3,
            ColorModel::Cmyk => 4,
        }
    }
}

fn first_filter(stream: &Stream) -> Option<Vec<u8>> {
    match stream.dict.get(b"Filter").ok()? {
        Object::Name(n) => Some(n.clone()),
        Object::Array(items) => items.first().and_then(|f| f.as_name().ok()).map(<[u8]>::to_vec),
        _ => None,
    }
}

fn color_model(doc: &Document, stream: &Stream) -> Option<ColorModel> {
    let cs = stream.dict.get(b"ColorSpace").ok()?;
    let cs = match cs {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };

    match cs {
        Object::Name(name) => ColorModel::from_name(name),
        Object::Array(items) => {
            let family = items.first()?.as_name().ok()?;
            match family {
                b"ICCBased" => {
                    let profile_id = items.get(1)?.as_reference().ok()?;
                    let profile = doc.get_object(profile_id).ok()?.as_stream().ok()?;
                    let n = profile.dict.get(b"N").ok()?.as_i64().ok()?;
                    ColorModel::from_components(n)
                }
                b"CalRGB" | b"CalGray" => ColorModel::from_name(family),
                _ => None,
            }
        }
        _ => None,
    }
}

fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    samples
        .chunks_exact(4)
        .flat_map(|px| {
            let k = 1.0 - px[3] as f32 / 255.0;
            let channel = |v: u8| ((1.0 - v as f32 / 255.0) * k * 255.0).round() as u8;
            [channel(px[0]), channel(px[1]), channel(px[2])]
        })
        .collect()
}

fn raw_to_image(
    samples: &[u8],
    width: u32,
    height: u32,
    model: ColorModel,
) -> Result<DynamicImage, String> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(model.channels()))
        .ok_or_else(|| format!("{}x{} image is too large", width, height))?;
    if samples.len() < expected {
        return Err(format!(
            "{} bytes of samples, expected {}",
            samples.len(),
            expected
        ));
    }
    let samples = &samples[..expected];

    let img = match model {
        ColorModel::Gray => GrayImage::from_raw(width, height, samples.to_vec())
            .map(DynamicImage::ImageLuma8),
        ColorModel::Rgb => {
            RgbImage::from_raw(width, height, samples.to_vec()).map(DynamicImage::ImageRgb8)
        }
        ColorModel::Cmyk => {
            RgbImage::from_raw(width, height, cmyk_to_rgb(samples)).map(DynamicImage::ImageRgb8)
        }
    };
    img.ok_or_else(|| "Sample buffer does not match dimensions".to_string())
}

/// A positive `/Width` or `/Height` that fits in `u32`
fn dimension(stream: &Stream, key: &[u8]) -> Result<u32, String> {
    let name = String::from_utf8_lossy(key);
    let value = stream
        .dict
        .get(key)
        .and_then(|v| v.as_i64())
        .map_err(|_| format!("missing {}", name))?;
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| format!("invalid {} {}", name, value))
}

/// Decode one image XObject; `Ok(None)` means it was deliberately skipped
fn decode_image(doc: &Document, stream: &Stream) -> Result<Option<DynamicImage>, String> {
    let (width, height) = (dimension(stream, b"Width")?, dimension(stream, b"Height")?);

    match first_filter(stream).as_deref() {
        Some(b"DCTDecode") => image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map(Some)
            .map_err(|e| format!("JPEG decode failed: {}", e)),
        Some(b"FlateDecode") | None => {
            let bits = stream
                .dict
                .get(b"BitsPerComponent")
                .and_then(|v| v.as_i64())
                .unwrap_or(8);
            if bits != 8 {
                tracing::warn!(bits, "Skipping image with unsupported bit depth");
                return Ok(None);
            }
            let Some(model) = color_model(doc, stream) else {
                tracing::warn!("Skipping image with unsupported colour space");
                return Ok(None);
            };
            let samples = if stream.dict.has(b"Filter") {
                stream
                    .decompressed_content()
                    .map_err(|e| format!("Flate decode failed: {}", e))?
            } else {
                stream.content.clone()
            };
            raw_to_image(&samples, width, height, model).map(Some)
        }
        Some(other) => {
            tracing::warn!(
                filter = %String::from_utf8_lossy(other),
                "Skipping image with unsupported filter"
            );
            Ok(None)
        }
    }
}

/// Decoded raster images of every page, in page order
pub fn extract_page_images(doc: &Document) -> Result<Vec<Vec<DynamicImage>>, PdfError> {
    let mut pages = Vec::new();

    for (number, page_id) in doc.get_pages() {
        let resources = effective_resources(doc, page_id);
        let xobjects = match resources.get(b"XObject") {
            Ok(Object::Dictionary(d)) => Some(d.clone()),
            Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok().cloned(),
            _ => None,
        };

        let mut images = Vec::new();
        for (name, value) in xobjects.iter().flat_map(|d| d.iter()) {
            let Ok(id) = value.as_reference() else {
                continue;
            };
            let Ok(stream) = doc.get_object(id).and_then(Object::as_stream) else {
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(|s| s.as_name())
                .map(|s| s == b"Image")
                .unwrap_or(false);
            if !is_image {
                continue;
            }

            match decode_image(doc, stream) {
                Ok(Some(img)) => images.push(img),
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    page = number,
                    name = %String::from_utf8_lossy(name),
                    error = %e,
                    "Failed to decode embedded image"
                ),
            }
        }
        pages.push(images);
    }

    Ok(pages)
}
