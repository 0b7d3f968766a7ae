//! QR code generation and scanning

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};

use super::ToolError;

pub const DEFAULT_SIZE: u32 = 256;
const MIN_SIZE: u32 = 64;
const MAX_SIZE: u32 = 2048;

/// Light modules around the symbol
const QUIET_ZONE: u32 = 4;

/// PNG of `text` at high error correction, about `size` pixels square
pub fn generate(text: &str, size: u32) -> Result<Vec<u8>, ToolError> {
    if text.trim().is_empty() {
        return Err(ToolError::invalid("Please enter text or URL"));
    }
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::H)
        .map_err(|e| ToolError::invalid(format!("Cannot encode QR code: {}", e)))?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let span = modules + 2 * QUIET_ZONE;
    let scale = (size.clamp(MIN_SIZE, MAX_SIZE) / span).max(1);

    let img = GrayImage::from_fn(span * scale, span * scale, |x, y| {
        let (mx, my) = (x / scale, y / scale);
        let inside = (QUIET_ZONE..QUIET_ZONE + modules).contains(&mx)
            && (QUIET_ZONE..QUIET_ZONE + modules).contains(&my);
        let dark = inside
            && colors[((my - QUIET_ZONE) * modules + (mx - QUIET_ZONE)) as usize] == Color::Dark;
        Luma([if dark { 0 } else { 255 }])
    });

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .map_err(|e| ToolError::invalid(format!("Failed to encode PNG: {}", e)))?;
    Ok(out)
}

/// Text of the first readable QR code in an encoded image
pub fn scan(image_bytes: &[u8]) -> Result<String, ToolError> {
    let gray = image::load_from_memory(image_bytes)
        .map_err(|e| ToolError::invalid(format!("Invalid image: {}", e)))?
        .to_luma8();

    let (width, height) = (gray.width() as usize, gray.height() as usize);
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| {
        gray.get_pixel(x as u32, y as u32).0[0]
    });

    let grids = prepared.detect_grids();
    tracing::debug!(grids = grids.len(), "Scanned image for QR codes");
    grids
        .iter()
        .find_map(|grid| grid.decode().ok())
        .map(|(_, text)| text)
        .ok_or_else(|| ToolError::invalid("No QR code found in the image"))
}
