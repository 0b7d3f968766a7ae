//! App icon generation

use image::imageops::FilterType;
use image::DynamicImage;

use super::compress::{decode, encode, EncodeFormat};
use super::error::ImagingError;

/// iOS icon sizes in points, rendered at @3x (the marketing icon at @1x)
pub const IOS_POINT_SIZES: &[(&str, f32)] = &[
    ("20", 20.0),
    ("29", 29.0),
    ("40", 40.0),
    ("60", 60.0),
    ("76", 76.0),
    ("83.5", 83.5),
    ("1024", 1024.0),
];

/// Android launcher icon edge per density bucket
pub const ANDROID_DENSITIES: &[(&str, u32)] = &[
    ("mdpi", 48),
    ("hdpi", 72),
    ("xhdpi", 96),
    ("xxhdpi", 144),
    ("xxxhdpi", 192),
];

const MARKETING_ICON: f32 = 1024.0;

#[derive(Debug)]
pub struct IconFile {
    /// Path inside the archive, e.g. `ios/Icon-20@3x.png`
    pub path: String,
    pub size: u32,
    pub data: Vec<u8>,
}

/// Largest centered square of the image
fn center_square(img: DynamicImage) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if w == h {
        return img;
    }
    let side = w.min(h);
    img.crop_imm((w - side) / 2, (h - side) / 2, side, side)
}

fn ios_icons() -> impl Iterator<Item = (String, u32)> {
    IOS_POINT_SIZES.iter().map(|(label, points)| {
        if *points >= MARKETING_ICON {
            (format!("ios/Icon-{}.png", label), *points as u32)
        } else {
            (
                format!("ios/Icon-{}@3x.png", label),
                (points * 3.0).round() as u32,
            )
        }
    })
}

fn android_icons() -> impl Iterator<Item = (String, u32)> {
    ANDROID_DENSITIES
        .iter()
        .map(|(density, px)| (format!("android/ic_launcher_{}.png", density), *px))
}

/// Render every iOS and Android icon variant as PNG
pub fn generate_icons(data: &[u8]) -> Result<Vec<IconFile>, ImagingError> {
    let (img, _) = decode(data)?;
    let square = center_square(img);

    let icons = ios_icons()
        .chain(android_icons())
        .map(|(path, size)| {
            let resized = square.resize_exact(size, size, FilterType::Lanczos3);
            let data = encode(&resized, EncodeFormat::Png, 100)?;
            Ok(IconFile { path, size, data })
        })
        .collect::<Result<Vec<_>, ImagingError>>()?;

    tracing::debug!(count = icons.len(), "Generated icon set");
    Ok(icons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::compress::tests::sample_png;

    #[test]
    fn test_icon_set_names_and_sizes() {
        let icons = generate_icons(&sample_png(300, 200)).unwrap();
        assert_eq!(icons.len(), IOS_POINT_SIZES.len() + ANDROID_DENSITIES.len());

        let find = |path: &str| icons.iter().find(|i| i.path == path).unwrap();

        assert_eq!(find("ios/Icon-20@3x.png").size, 60);
        assert_eq!(find("ios/Icon-83.5@3x.png").size, 251);
        assert_eq!(find("ios/Icon-1024.png").size, 1024);
        assert_eq!(find("android/ic_launcher_xxxhdpi.png").size, 192);

        let decoded = image::load_from_memory(&find("android/ic_launcher_mdpi.png").data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (48, 48));
    }

    #[test]
    fn test_center_square() {
        let img = DynamicImage::new_rgb8(30, 10);
        let sq = center_square(img);
        assert_eq!((sq.width(), sq.height()), (10, 10));
    }

    #[test]
    fn test_rejects_non_image() {
        assert!(generate_icons(b"%PDF-1.4").is_err());
    }
}
