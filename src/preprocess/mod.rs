//! Frame preprocessing pipeline
//!
//! Gesture raster to classifier input: tight square crop around the ink,
//! bilinear rescale to the model resolution, then alpha-to-intensity
//! extraction. The numeric conventions match MNIST (centered content,
//! intensities in [0, 1], background zero), so any MNIST-trained model
//! sees inputs shaped like its training data.

pub mod crop;
pub mod scale;
pub mod tensor;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use crop::{center_crop, ink_bounds, InkBounds};
pub use scale::rescale;
pub use tensor::InputTensor;

/// Input resolution of the stock MNIST models
pub const MNIST_SIDE: u32 = 28;

/// Preprocessing failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreprocessError {
    /// The surface holds no inked pixel at all
    #[error("no ink on the drawing surface")]
    EmptyFrame,
}

/// Geometry knobs for crop and rescale
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Total padding added around the ink bounding box, px
    pub padding: u32,
    /// Classifier input resolution (square)
    pub target_size: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            padding: 20,
            target_size: MNIST_SIDE,
        }
    }
}

/// Full pipeline for one completed gesture.
pub fn frame_to_tensor(
    surface: &RgbaImage,
    config: &PreprocessConfig,
) -> Result<InputTensor, PreprocessError> {
    let cropped = center_crop(surface, config.padding)?;
    let scaled = rescale(&cropped, config.target_size);
    debug!(
        crop_side = cropped.width(),
        target = config.target_size,
        "preprocessed frame"
    );
    Ok(InputTensor::from_alpha(&scaled))
}
