//! Stroke rendering
//!
//! Repaints the visible raster from the recorded stroke list. The raster is
//! always a pure function of the session: every repaint starts from a blank
//! surface, so there is no incremental state that can drift out of sync
//! with the strokes. Cost is bounded by the total recorded point count,
//! which stays small for a single drawing surface.

pub mod path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::input::{Point, Session};
use path::{distance, flatten, smooth_stroke};

/// Quad flattening tolerance, px
const FLATTEN_STEP: f32 = 1.0;

/// Disc spacing along the painted path, px
const STAMP_SPACING: f32 = 1.0;

/// Fully transparent background pixel
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Brush the session is painted with: fixed width, single opaque color.
/// Caps and joins are round because strokes are stamped as discs.
#[derive(Debug, Clone, Copy)]
pub struct Brush {
    pub width: f32,
    pub color: Rgba<u8>,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            width: 20.0,
            color: Rgba([0x39, 0x3e, 0x46, 0xff]),
        }
    }
}

impl Brush {
    /// Stamp radius in whole pixels, at least 1
    fn radius(&self) -> i32 {
        ((self.width / 2.0).round() as i32).max(1)
    }
}

/// Clears `surface` and repaints every stroke in `session`.
pub fn render_session(session: &Session, surface: &mut RgbaImage, brush: &Brush) {
    for pixel in surface.pixels_mut() {
        *pixel = BLANK;
    }
    for stroke in session.strokes() {
        render_stroke(stroke.points(), surface, brush);
    }
}

/// Paints one stroke. Strokes still waiting for their second point draw
/// nothing.
pub fn render_stroke(points: &[Point], surface: &mut RgbaImage, brush: &Brush) {
    let Some(path) = smooth_stroke(points) else {
        return;
    };
    let polyline = flatten(&path, FLATTEN_STEP);
    stamp_polyline(&polyline, surface, brush);
}

/// Walks the polyline stamping filled discs at sub-pixel spacing. Discs
/// outside the surface bounds are clipped by the drawing primitive.
fn stamp_polyline(polyline: &[Point], surface: &mut RgbaImage, brush: &Brush) {
    let radius = brush.radius();
    let Some(&first) = polyline.first() else {
        return;
    };
    stamp(surface, first, radius, brush.color);
    let mut prev = first;
    for &next in &polyline[1..] {
        let steps = (distance(prev, next) / STAMP_SPACING).ceil() as usize;
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let at = Point::new(prev.x + (next.x - prev.x) * t, prev.y + (next.y - prev.y) * t);
            stamp(surface, at, radius, brush.color);
        }
        prev = next;
    }
}

fn stamp(surface: &mut RgbaImage, center: Point, radius: i32, color: Rgba<u8>) {
    draw_filled_circle_mut(
        surface,
        (center.x.round() as i32, center.y.round() as i32),
        radius,
        color,
    );
}
