//! Raster image processing
//!
//! - `compress`: re-encode and resize uploads for the image compressor
//! - `icons`: app icon sets for iOS and Android
//! - `palette`: dominant colour extraction

pub(crate) mod compress;
mod error;
mod icons;
mod palette;

pub use compress::{compress_image, CompressOptions, CompressedImage, EncodeFormat, OutputFormat};
pub use error::ImagingError;
pub use icons::{generate_icons, IconFile, ANDROID_DENSITIES, IOS_POINT_SIZES};
pub use palette::dominant_colors;
