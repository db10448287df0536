//! Stroke recording
//!
//! Accumulates pointer gestures into an ordered stroke list. A session is
//! everything drawn since the last clear; it outlives individual gestures
//! and is only emptied on an explicit clear.

/// A canvas-local coordinate pair. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points
    pub fn midpoint(a: Point, b: Point) -> Point {
        Point {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        }
    }
}

/// One continuous pointer-down-to-up gesture segment. Points are
/// append-only; their order defines the curve interpolation.
#[derive(Debug, Clone, Default)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Append a point to the end of the stroke
    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// All recorded points, in draw order
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Everything drawn since the last clear, plus the gesture activity flag.
///
/// State machine: Idle and Drawing. `begin_stroke` moves Idle -> Drawing
/// and opens a stroke holding the start point; `add_point` extends the
/// current stroke and is a no-op while Idle; `end_stroke` moves back to
/// Idle without touching the points; `clear` resets to an empty Idle
/// session from any state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    strokes: Vec<Stroke>,
    drawing: bool,
}

impl Session {
    /// Create an empty idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Gesture start: opens a new stroke with its first point.
    pub fn begin_stroke(&mut self, start: Point) {
        self.drawing = true;
        let mut stroke = Stroke::default();
        stroke.push(start);
        self.strokes.push(stroke);
    }

    /// Gesture move: appends to the current stroke. No-op while idle.
    pub fn add_point(&mut self, point: Point) {
        if !self.drawing {
            return;
        }
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.push(point);
        }
    }

    /// Gesture end: the stroke keeps the points it already has.
    pub fn end_stroke(&mut self) {
        self.drawing = false;
    }

    /// Clear command: back to an empty idle session.
    pub fn clear(&mut self) {
        self.drawing = false;
        self.strokes.clear();
    }

    /// Whether a gesture is currently open
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Whether anything has been drawn since the last clear
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// All strokes, oldest first
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }
}
