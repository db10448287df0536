//! Drawing canvas
//!
//! Couples the recorded session with its rendered raster. Every move event
//! repaints the raster from the stroke list, so the raster is exactly the
//! render of the session at all times and a clear wipes both together.

use image::{Rgba, RgbaImage};

use crate::input::{Point, Session};
use crate::render::{render_session, Brush};

pub struct Canvas {
    session: Session,
    surface: RgbaImage,
    // Stroke width and color are fixed, not a user setting.
    brush: Brush,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            session: Session::new(),
            surface: RgbaImage::new(width, height),
            brush: Brush::default(),
        }
    }

    /// Gesture start: opens a stroke. The lone starting point has no
    /// visible ink yet; it is painted once the gesture moves.
    pub fn begin_stroke(&mut self, start: Point) {
        self.session.begin_stroke(start);
    }

    /// Gesture move: appends the point and repaints. No-op while idle.
    pub fn extend_stroke(&mut self, point: Point) {
        if !self.session.is_drawing() {
            return;
        }
        self.session.add_point(point);
        render_session(&self.session, &mut self.surface, &self.brush);
    }

    /// Gesture end
    pub fn end_stroke(&mut self) {
        self.session.end_stroke();
    }

    /// Wipes strokes and raster together.
    pub fn clear(&mut self) {
        self.session.clear();
        for pixel in self.surface.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }
}
