//! Dominant colour extraction
//!
//! Downsamples the image, buckets pixels on a 5-bit-per-channel grid and
//! returns the average colour of the most populated buckets.

use std::collections::HashMap;

use image::imageops::FilterType;

use super::compress::decode;
use super::error::ImagingError;

/// Edge of the thumbnail pixels are sampled from
const SAMPLE_EDGE: u32 = 64;

/// Alpha below which a pixel is ignored
const MIN_ALPHA: u8 = 125;

#[derive(Default)]
struct Bucket {
    count: u64,
    r: u64,
    g: u64,
    b: u64,
}

impl Bucket {
    fn average(&self) -> [u8; 3] {
        [
            (self.r / self.count) as u8,
            (self.g / self.count) as u8,
            (self.b / self.count) as u8,
        ]
    }
}

/// Up to `count` dominant colours, most frequent first
pub fn dominant_colors(data: &[u8], count: usize) -> Result<Vec<[u8; 3]>, ImagingError> {
    let (img, _) = decode(data)?;
    let thumb = img
        .resize(SAMPLE_EDGE, SAMPLE_EDGE, FilterType::Triangle)
        .to_rgba8();

    let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();
    for pixel in thumb.pixels() {
        let [r, g, b, a] = pixel.0;
        if a < MIN_ALPHA {
            continue;
        }
        let bucket = buckets.entry((r >> 3, g >> 3, b >> 3)).or_default();
        bucket.count += 1;
        bucket.r += r as u64;
        bucket.g += g as u64;
        bucket.b += b as u64;
    }

    let mut ranked: Vec<(&(u8, u8, u8), &Bucket)> = buckets.iter().collect();
    // Ties broken by bucket key so results are deterministic
    ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(b.0)));

    Ok(ranked
        .into_iter()
        .take(count)
        .map(|(_, bucket)| bucket.average())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    #[test]
    fn test_two_tone_image() {
        // Three quarters red, one quarter blue
        let img = RgbImage::from_fn(40, 40, |x, _| {
            if x < 30 {
                Rgb([220, 20, 20])
            } else {
                Rgb([20, 20, 220])
            }
        });
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let colors = dominant_colors(&png, 5).unwrap();
        assert!(!colors.is_empty());
        let first = colors[0];
        assert!(first[0] > 200 && first[2] < 40, "expected red first, got {:?}", first);
        assert!(colors.iter().any(|c| c[2] > 200 && c[0] < 40));
    }
}
