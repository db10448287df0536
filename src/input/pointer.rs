//! Pointer event normalization
//!
//! Mouse and touch events carry their coordinates differently. This module
//! folds both shapes into one enum and maps absolute positions into
//! canvas-local points, so the recorder never sees device specifics.

use super::session::Point;

/// Absolute position of a single touch contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

/// A pointer event reduced to the fields the recorder needs
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    /// Mouse event with absolute coordinates
    Mouse { x: f32, y: f32 },
    /// Touch event with the currently active contacts
    Touch { touches: Vec<TouchPoint> },
}

/// Bounding rectangle of the drawing canvas in absolute coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    /// Create a rect from its origin and size
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rect for a canvas sitting at the origin (traces, tests)
    pub fn at_origin(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

impl PointerInput {
    /// Canvas-local position: absolute position minus the canvas origin.
    /// Touch events use the first active contact; a touch event with no
    /// contacts has no position.
    pub fn canvas_position(&self, rect: &CanvasRect) -> Option<Point> {
        let (x, y) = match self {
            PointerInput::Mouse { x, y } => (*x, *y),
            PointerInput::Touch { touches } => {
                let first = touches.first()?;
                (first.x, first.y)
            }
        };
        Some(Point::new(x - rect.left, y - rect.top))
    }
}
