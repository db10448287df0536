//! Raster rescaling
//!
//! Downsamples the square crop to the classifier's input resolution with
//! bilinear filtering (`FilterType::Triangle`). The resampler is pinned
//! rather than configurable: a model trained against captures produced by
//! linear filtering will drift in accuracy under a different kernel.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Rescales `crop` to `target` x `target`. The input is already square, so
/// one uniform factor covers both axes and the aspect ratio is kept.
pub fn rescale(crop: &RgbaImage, target: u32) -> RgbaImage {
    imageops::resize(crop, target, target, FilterType::Triangle)
}
