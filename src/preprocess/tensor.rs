//! Intensity extraction
//!
//! Turns the rescaled raster's coverage (alpha) channel into the flat
//! row-major float grid the classifier consumes. Color channels carry no
//! information for a single-color brush and are ignored; alpha is what the
//! renderer actually painted, including the soft bilinear edges.

use image::RgbaImage;
use ndarray::Array4;

/// Flat row-major intensity grid over a square raster, values in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    values: Vec<f32>,
    side: u32,
}

impl InputTensor {
    /// Reads alpha / 255 per pixel, rows top to bottom. The raster must be
    /// square.
    pub fn from_alpha(raster: &RgbaImage) -> Self {
        let (width, height) = raster.dimensions();
        debug_assert_eq!(width, height, "intensity grids are square");
        let mut values = Vec::with_capacity((width * height) as usize);
        for pixel in raster.pixels() {
            values.push(pixel.0[3] as f32 / 255.0);
        }
        Self {
            values,
            side: width,
        }
    }

    /// Side length of the square grid
    pub fn side(&self) -> u32 {
        self.side
    }

    /// Flat values, row-major
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// NCHW batch view (1 x 1 x side x side) for the inference session
    pub fn to_nchw(&self) -> Array4<f32> {
        let side = self.side() as usize;
        let values = self.values();
        Array4::from_shape_fn((1, 1, side, side), |(_, _, y, x)| values[y * side + x])
    }

    /// Terminal preview of the grid, densest ink as '@'
    pub fn ascii_art(&self) -> String {
        const RAMP: &[u8] = b" .:-=+*#%@";
        let side = self.side() as usize;
        let mut art = String::with_capacity(side * (side + 1));
        for y in 0..side {
            for x in 0..side {
                let value = self.values()[y * side + x].clamp(0.0, 1.0);
                let index = (value * (RAMP.len() - 1) as f32).round() as usize;
                art.push(RAMP[index] as char);
            }
            art.push('\n');
        }
        art
    }
}
