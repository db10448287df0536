//! Smoothed path construction
//!
//! Builds the curve a stroke is painted with. Every consecutive raw pair
//! contributes a quadratic segment ending at the pair's midpoint with the
//! earlier point as control, so the painted line passes through midpoints
//! and jitter in the raw samples is absorbed by the curves. A closing
//! straight segment reaches the final raw point so stroke ends are not cut
//! short.

use crate::input::Point;

/// One drawable piece of a smoothed stroke path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Quadratic curve to `to` with control point `ctrl`
    Quad { ctrl: Point, to: Point },
    /// Straight line to `to`
    Line { to: Point },
}

/// A stroke path: a start point plus the segments leading away from it
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePath {
    pub start: Point,
    pub segments: Vec<PathSegment>,
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Builds the smoothed path for one stroke. Strokes with fewer than two
/// points produce no path; a starting dot only becomes visible once the
/// gesture moves.
pub fn smooth_stroke(points: &[Point]) -> Option<StrokePath> {
    if points.len() < 2 {
        return None;
    }
    let mut segments = Vec::with_capacity(points.len());
    for pair in points.windows(2) {
        segments.push(PathSegment::Quad {
            ctrl: pair[0],
            to: Point::midpoint(pair[0], pair[1]),
        });
    }
    // The last quad stops at a midpoint; close the gap to the raw end.
    segments.push(PathSegment::Line {
        to: points[points.len() - 1],
    });
    Some(StrokePath {
        start: points[0],
        segments,
    })
}

/// Flattens the path into a polyline. Quadratic segments are sampled so
/// consecutive samples sit at most `max_step` apart; line segments keep
/// their endpoints only.
pub fn flatten(path: &StrokePath, max_step: f32) -> Vec<Point> {
    let mut polyline = vec![path.start];
    let mut cursor = path.start;
    for segment in &path.segments {
        match *segment {
            PathSegment::Line { to } => {
                polyline.push(to);
                cursor = to;
            }
            PathSegment::Quad { ctrl, to } => {
                // The control polygon length bounds the arc length.
                let bound = distance(cursor, ctrl) + distance(ctrl, to);
                let steps = ((bound / max_step).ceil() as usize).max(1);
                for i in 1..=steps {
                    let t = i as f32 / steps as f32;
                    polyline.push(quad_at(cursor, ctrl, to, t));
                }
                cursor = to;
            }
        }
    }
    polyline
}

/// Point on a quadratic Bezier at parameter `t`
fn quad_at(from: Point, ctrl: Point, to: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * from.x + 2.0 * u * t * ctrl.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * ctrl.y + t * t * to.y,
    )
}
