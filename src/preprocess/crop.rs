//! Ink bounding box and square center crop
//!
//! Finds the tight box around every inked pixel, then copies the content
//! into the middle of a square raster whose side is the larger box span
//! plus a fixed padding. Wide and tall digits end up with the same
//! relative margin, matching how the MNIST training digits are framed.

use image::RgbaImage;

use super::PreprocessError;

/// Tight bounds of inked (alpha > 0) pixels, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InkBounds {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl InkBounds {
    /// Horizontal span, max minus min
    pub fn span_x(&self) -> u32 {
        self.max_x - self.min_x
    }

    /// Vertical span, max minus min
    pub fn span_y(&self) -> u32 {
        self.max_y - self.min_y
    }
}

/// Scans the surface for the tight ink bounding box. None when nothing is
/// inked.
pub fn ink_bounds(surface: &RgbaImage) -> Option<InkBounds> {
    let mut bounds: Option<InkBounds> = None;
    for (x, y, pixel) in surface.enumerate_pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        match &mut bounds {
            None => {
                bounds = Some(InkBounds {
                    min_x: x,
                    min_y: y,
                    max_x: x,
                    max_y: y,
                })
            }
            Some(b) => {
                b.min_x = b.min_x.min(x);
                b.min_y = b.min_y.min(y);
                b.max_x = b.max_x.max(x);
                b.max_y = b.max_y.max(y);
            }
        }
    }
    bounds
}

/// Produces the square padded crop centered on the ink bounding box.
pub fn center_crop(surface: &RgbaImage, padding: u32) -> Result<RgbaImage, PreprocessError> {
    let bounds = ink_bounds(surface).ok_or(PreprocessError::EmptyFrame)?;
    Ok(crop_to_bounds(surface, bounds, padding))
}

/// Square crop around known bounds. The side is the larger span plus the
/// full padding, so roughly half the padding lands on each side. Content
/// is centered; area reaching outside the source stays transparent.
pub fn crop_to_bounds(surface: &RgbaImage, bounds: InkBounds, padding: u32) -> RgbaImage {
    let span = bounds.span_x().max(bounds.span_y());
    let side = (span + padding).max(1);

    let content_w = bounds.span_x() as i64 + 1;
    let content_h = bounds.span_y() as i64 + 1;
    let origin_x = bounds.min_x as i64 - (side as i64 - content_w) / 2;
    let origin_y = bounds.min_y as i64 - (side as i64 - content_h) / 2;

    let mut crop = RgbaImage::new(side, side);
    for dy in 0..side {
        for dx in 0..side {
            let sx = origin_x + dx as i64;
            let sy = origin_y + dy as i64;
            if sx < 0 || sy < 0 || sx >= surface.width() as i64 || sy >= surface.height() as i64 {
                continue;
            }
            crop.put_pixel(dx, dy, *surface.get_pixel(sx as u32, sy as u32));
        }
    }
    crop
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const INK: Rgba<u8> = Rgba([0x39, 0x3e, 0x46, 0xff]);

    fn surface_with_pixels(size: u32, pixels: &[(u32, u32)]) -> RgbaImage {
        let mut surface = RgbaImage::new(size, size);
        for &(x, y) in pixels {
            surface.put_pixel(x, y, INK);
        }
        surface
    }

    #[test]
    fn test_blank_surface_has_no_bounds() {
        let surface = RgbaImage::new(64, 64);
        assert!(ink_bounds(&surface).is_none());
    }

    #[test]
    fn test_blank_surface_is_an_empty_frame() {
        let surface = RgbaImage::new(64, 64);
        assert_eq!(
            center_crop(&surface, 20).unwrap_err(),
            PreprocessError::EmptyFrame
        );
    }

    #[test]
    fn test_bounds_are_tight_and_inclusive() {
        let surface = surface_with_pixels(64, &[(10, 20), (30, 25), (15, 40)]);
        let bounds = ink_bounds(&surface).unwrap();

        assert_eq!(
            bounds,
            InkBounds {
                min_x: 10,
                min_y: 20,
                max_x: 30,
                max_y: 40,
            }
        );
        assert_eq!(bounds.span_x(), 20);
        assert_eq!(bounds.span_y(), 20);
    }

    #[test]
    fn test_crop_is_square_with_padded_side() {
        // A wide box: 40 apart in x, 10 in y.
        let surface = surface_with_pixels(128, &[(30, 60), (70, 70)]);
        let crop = center_crop(&surface, 20).unwrap();

        assert_eq!(crop.dimensions(), (60, 60));
    }

    #[test]
    fn test_single_pixel_crop_side_equals_padding() {
        let surface = surface_with_pixels(64, &[(32, 32)]);
        let crop = center_crop(&surface, 20).unwrap();

        assert_eq!(crop.dimensions(), (20, 20));
    }

    #[test]
    fn test_single_pixel_zero_padding_still_one_pixel() {
        let surface = surface_with_pixels(64, &[(32, 32)]);
        let crop = center_crop(&surface, 0).unwrap();

        assert_eq!(crop.dimensions(), (1, 1));
        assert_eq!(*crop.get_pixel(0, 0), INK);
    }

    #[test]
    fn test_content_is_centered() {
        let surface = surface_with_pixels(64, &[(32, 32)]);
        let crop = center_crop(&surface, 5).unwrap();

        // Side 5, single pixel of content, so it lands in the middle cell.
        assert_eq!(crop.dimensions(), (5, 5));
        for (x, y, pixel) in crop.enumerate_pixels() {
            if (x, y) == (2, 2) {
                assert_eq!(*pixel, INK);
            } else {
                assert_eq!(pixel.0[3], 0);
            }
        }
    }

    #[test]
    fn test_area_outside_source_stays_transparent() {
        // Ink in the top-left corner; padding pushes the crop past the edge.
        let surface = surface_with_pixels(64, &[(0, 0), (4, 4)]);
        let crop = center_crop(&surface, 16).unwrap();

        assert_eq!(crop.dimensions(), (20, 20));
        // Rows above the source edge carry no ink.
        for x in 0..20 {
            assert_eq!(crop.get_pixel(x, 0).0[3], 0);
        }
        // The inked corner survives inside the crop.
        assert!(crop.pixels().any(|pixel| pixel.0[3] > 0));
    }

    #[test]
    fn test_crop_preserves_pixel_values() {
        let surface = surface_with_pixels(64, &[(20, 20), (40, 40)]);
        let crop = center_crop(&surface, 10).unwrap();

        let inked: Vec<_> = crop
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel.0[3] > 0)
            .collect();
        assert_eq!(inked.len(), 2);
        for (_, _, pixel) in inked {
            assert_eq!(*pixel, INK);
        }
    }
}
