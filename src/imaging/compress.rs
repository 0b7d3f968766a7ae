//! Image compression
//!
//! Decodes an upload, optionally resizes it, and re-encodes it in the
//! requested format. CPU bound; callers run it on the blocking pool.

use std::io::Cursor;
use std::str::FromStr;

use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use super::error::ImagingError;

/// Largest edge a resize may request
const MAX_DIMENSION: u32 = 10_000;

/// AVIF encoder speed (1 slowest .. 10 fastest)
const AVIF_SPEED: u8 = 8;

/// Format requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
    Avif,
    Gif,
    /// Keep the format of each input
    Original,
}

impl FromStr for OutputFormat {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            "avif" => Ok(OutputFormat::Avif),
            "gif" => Ok(OutputFormat::Gif),
            "original" => Ok(OutputFormat::Original),
            other => Err(ImagingError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Concrete encoder an output is produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Jpeg,
    Png,
    Webp,
    Avif,
    Gif,
}

impl EncodeFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            EncodeFormat::Jpeg => "image/jpeg",
            EncodeFormat::Png => "image/png",
            EncodeFormat::Webp => "image/webp",
            EncodeFormat::Avif => "image/avif",
            EncodeFormat::Gif => "image/gif",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            EncodeFormat::Jpeg => "jpg",
            EncodeFormat::Png => "png",
            EncodeFormat::Webp => "webp",
            EncodeFormat::Avif => "avif",
            EncodeFormat::Gif => "gif",
        }
    }

    /// Encoder matching a decoded input format
    fn from_detected(format: ImageFormat) -> Result<Self, ImagingError> {
        match format {
            ImageFormat::Jpeg => Ok(EncodeFormat::Jpeg),
            ImageFormat::Png => Ok(EncodeFormat::Png),
            ImageFormat::WebP => Ok(EncodeFormat::Webp),
            ImageFormat::Avif => Ok(EncodeFormat::Avif),
            ImageFormat::Gif => Ok(EncodeFormat::Gif),
            other => Err(ImagingError::UnsupportedFormat(format!(
                "cannot keep original format {:?}",
                other
            ))),
        }
    }
}

impl OutputFormat {
    fn resolve(self, detected: ImageFormat) -> Result<EncodeFormat, ImagingError> {
        match self {
            OutputFormat::Jpeg => Ok(EncodeFormat::Jpeg),
            OutputFormat::Png => Ok(EncodeFormat::Png),
            OutputFormat::Webp => Ok(EncodeFormat::Webp),
            OutputFormat::Avif => Ok(EncodeFormat::Avif),
            OutputFormat::Gif => Ok(EncodeFormat::Gif),
            OutputFormat::Original => EncodeFormat::from_detected(detected),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// 1..=100
    pub quality: u8,
    pub format: OutputFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Fit inside the box instead of stretching to it
    pub maintain_aspect: bool,
    pub without_enlargement: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: 80,
            format: OutputFormat::Webp,
            width: None,
            height: None,
            maintain_aspect: true,
            without_enlargement: true,
        }
    }
}

#[derive(Debug)]
pub struct CompressedImage {
    pub data: Vec<u8>,
    pub format: EncodeFormat,
    pub width: u32,
    pub height: u32,
}

/// PNG zlib effort derived from quality: lower quality, harder compression
fn png_compression(quality: u8) -> CompressionType {
    let level = ((100.0 - quality as f32) / 11.11).floor() as u8;
    match level {
        0..=2 => CompressionType::Fast,
        3..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn scaled(value: u32, scale: f64) -> u32 {
    ((value as f64 * scale).round() as u32).max(1)
}

/// Output dimensions for `(w, h)`, or `None` when no resize applies
fn target_dimensions(w: u32, h: u32, opts: &CompressOptions) -> Option<(u32, u32)> {
    let (nw, nh) = match (opts.width, opts.height) {
        (None, None) => return None,
        (Some(tw), Some(th)) if !opts.maintain_aspect => {
            if opts.without_enlargement && (w < tw || h < th) {
                return None;
            }
            (tw, th)
        }
        (tw, th) => {
            let sx = tw.map(|tw| tw as f64 / w as f64);
            let sy = th.map(|th| th as f64 / h as f64);
            let mut scale = match (sx, sy) {
                (Some(sx), Some(sy)) => sx.min(sy),
                (Some(s), None) | (None, Some(s)) => s,
                (None, None) => 1.0,
            };
            if opts.without_enlargement {
                scale = scale.min(1.0);
            }
            (scaled(w, scale), scaled(h, scale))
        }
    };

    if (nw, nh) == (w, h) {
        None
    } else {
        Some((nw, nh))
    }
}

fn validate(opts: &CompressOptions) -> Result<(), ImagingError> {
    for dim in [opts.width, opts.height].into_iter().flatten() {
        if dim == 0 || dim > MAX_DIMENSION {
            return Err(ImagingError::InvalidDimensions(format!(
                "{} (must be 1..={})",
                dim, MAX_DIMENSION
            )));
        }
    }
    Ok(())
}

/// Decode with format detection
pub(crate) fn decode(data: &[u8]) -> Result<(DynamicImage, ImageFormat), ImagingError> {
    let format = image::guess_format(data)
        .map_err(|_| ImagingError::Decode("unrecognized image data".to_string()))?;
    let img = image::load_from_memory_with_format(data, format)
        .map_err(|e| ImagingError::Decode(e.to_string()))?;
    Ok((img, format))
}

/// Encode `img` with the given encoder
pub(crate) fn encode(
    img: &DynamicImage,
    format: EncodeFormat,
    quality: u8,
) -> Result<Vec<u8>, ImagingError> {
    let mut output = Vec::new();
    let quality = quality.clamp(1, 100);

    let result = match format {
        EncodeFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut output, quality))
        }
        EncodeFormat::Png => img.write_with_encoder(PngEncoder::new_with_quality(
            &mut output,
            png_compression(quality),
            PngFilter::Adaptive,
        )),
        EncodeFormat::Webp => {
            // The bundled WebP encoder is lossless only
            let converted = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            converted.write_with_encoder(WebPEncoder::new_lossless(&mut output))
        }
        EncodeFormat::Avif => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_with_encoder(AvifEncoder::new_with_speed_quality(
                &mut output,
                AVIF_SPEED,
                quality,
            ))
        }
        EncodeFormat::Gif => {
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_to(&mut Cursor::new(&mut output), ImageFormat::Gif)
        }
    };

    result.map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(output)
}

/// Compress one image
pub fn compress_image(data: &[u8], opts: &CompressOptions) -> Result<CompressedImage, ImagingError> {
    validate(opts)?;

    let (img, detected) = decode(data)?;
    let format = opts.format.resolve(detected)?;

    let img = match target_dimensions(img.width(), img.height(), opts) {
        Some((w, h)) => img.resize_exact(w, h, FilterType::Lanczos3),
        None => img,
    };

    let data = encode(&img, format, opts.quality)?;

    tracing::debug!(
        format = ?format,
        width = img.width(),
        height = img.height(),
        size = data.len(),
        "Compressed image"
    );

    Ok(CompressedImage {
        data,
        format,
        width: img.width(),
        height: img.height(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    pub(crate) fn sample_png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x * 7) as u8, (y * 5) as u8, 128]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    fn sample_jpeg(w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([200, 40, 40]));
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
            .unwrap();
        out
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("original".parse::<OutputFormat>().unwrap(), OutputFormat::Original);
        assert!(matches!(
            "tiff".parse::<OutputFormat>(),
            Err(ImagingError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_each_format_decodes_with_matching_mime() {
        let input = sample_png(40, 30);
        for (format, expected) in [
            (OutputFormat::Jpeg, ImageFormat::Jpeg),
            (OutputFormat::Png, ImageFormat::Png),
            (OutputFormat::Webp, ImageFormat::WebP),
            (OutputFormat::Gif, ImageFormat::Gif),
        ] {
            let opts = CompressOptions {
                format,
                ..CompressOptions::default()
            };
            let out = compress_image(&input, &opts).unwrap();
            assert_eq!(image::guess_format(&out.data).unwrap(), expected);
            assert_eq!(out.format.mime_type(), expected.to_mime_type());
            image::load_from_memory(&out.data).unwrap();
        }
    }

    #[test]
    fn test_avif_output_has_avif_signature() {
        let opts = CompressOptions {
            format: OutputFormat::Avif,
            quality: 50,
            ..CompressOptions::default()
        };
        let out = compress_image(&sample_png(16, 16), &opts).unwrap();
        assert_eq!(out.format.mime_type(), "image/avif");
        assert_eq!(&out.data[4..8], b"ftyp");
    }

    #[test]
    fn test_original_keeps_input_format() {
        let opts = CompressOptions {
            format: OutputFormat::Original,
            ..CompressOptions::default()
        };
        let out = compress_image(&sample_jpeg(20, 20), &opts).unwrap();
        assert_eq!(out.format, EncodeFormat::Jpeg);
        assert_eq!(out.format.mime_type(), "image/jpeg");

        let out = compress_image(&sample_png(20, 20), &opts).unwrap();
        assert_eq!(out.format, EncodeFormat::Png);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 100]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let opts = CompressOptions {
            format: OutputFormat::Jpeg,
            ..CompressOptions::default()
        };
        let out = compress_image(&png, &opts).unwrap();
        assert_eq!(image::guess_format(&out.data).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_fit_inside_preserves_aspect() {
        let opts = CompressOptions {
            format: OutputFormat::Png,
            width: Some(50),
            height: Some(50),
            ..CompressOptions::default()
        };
        let out = compress_image(&sample_png(200, 100), &opts).unwrap();
        assert_eq!((out.width, out.height), (50, 25));
    }

    #[test]
    fn test_fill_stretches_to_box() {
        let opts = CompressOptions {
            format: OutputFormat::Png,
            width: Some(50),
            height: Some(50),
            maintain_aspect: false,
            ..CompressOptions::default()
        };
        let out = compress_image(&sample_png(200, 100), &opts).unwrap();
        assert_eq!((out.width, out.height), (50, 50));
    }

    #[test]
    fn test_single_dimension_scales_proportionally() {
        let opts = CompressOptions {
            format: OutputFormat::Png,
            height: Some(10),
            ..CompressOptions::default()
        };
        let out = compress_image(&sample_png(40, 20), &opts).unwrap();
        assert_eq!((out.width, out.height), (20, 10));
    }

    #[test]
    fn test_without_enlargement() {
        let opts = CompressOptions {
            format: OutputFormat::Png,
            width: Some(400),
            ..CompressOptions::default()
        };
        let out = compress_image(&sample_png(40, 20), &opts).unwrap();
        assert_eq!((out.width, out.height), (40, 20));

        let opts = CompressOptions {
            without_enlargement: false,
            ..opts
        };
        let out = compress_image(&sample_png(40, 20), &opts).unwrap();
        assert_eq!((out.width, out.height), (400, 200));
    }

    #[test]
    fn test_png_compression_levels() {
        assert_eq!(png_compression(100), CompressionType::Fast);
        assert_eq!(png_compression(80), CompressionType::Fast);
        assert_eq!(png_compression(50), CompressionType::Default);
        assert_eq!(png_compression(1), CompressionType::Best);
    }

    #[test]
    fn test_rejects_garbage_and_bad_dimensions() {
        let err = compress_image(b"not an image", &CompressOptions::default()).unwrap_err();
        assert!(err.is_client_error());

        let opts = CompressOptions {
            width: Some(0),
            ..CompressOptions::default()
        };
        let err = compress_image(&sample_png(4, 4), &opts).unwrap_err();
        assert!(matches!(err, ImagingError::InvalidDimensions(_)));
    }
}
