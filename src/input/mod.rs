//! Pointer input layer
//!
//! Normalizes mouse and touch events into canvas-local points and records
//! them as strokes.

pub mod pointer;
pub mod session;

pub use pointer::{CanvasRect, PointerInput, TouchPoint};
pub use session::{Point, Session, Stroke};
