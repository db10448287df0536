//! Gesture traces
//!
//! JSON-recorded pointer sessions, replayable against a pad. They keep the
//! whole pipeline drivable without a UI: capture a drawing once, then
//! re-run it through recording, preprocessing, and classification at will.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::app::DigitPad;
use crate::input::{CanvasRect, PointerInput};

/// One recorded pointer event, canvas-local coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Gesture start
    Down { x: f32, y: f32 },
    /// Gesture move
    Move { x: f32, y: f32 },
    /// Gesture end
    Up,
    /// Clear command
    Clear,
}

/// A recorded drawing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GestureTrace {
    pub events: Vec<TraceEvent>,
}

impl GestureTrace {
    /// Loads a trace from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read trace file {path:?}"))?;
        serde_json::from_str(&raw).with_context(|| format!("malformed trace file {path:?}"))
    }

    /// Saves the trace as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("failed to serialize trace")?;
        std::fs::write(path, raw).with_context(|| format!("failed to write trace file {path:?}"))
    }

    /// Feeds every event into the pad in order. Coordinates are taken as
    /// canvas-local, so the rect sits at the origin.
    pub fn replay(&self, pad: &DigitPad) {
        let rect = CanvasRect::at_origin(pad.canvas_width() as f32, pad.canvas_height() as f32);
        for event in &self.events {
            match *event {
                TraceEvent::Down { x, y } => {
                    pad.pointer_down(&PointerInput::Mouse { x, y }, &rect)
                }
                TraceEvent::Move { x, y } => {
                    pad.pointer_move(&PointerInput::Mouse { x, y }, &rect)
                }
                TraceEvent::Up => pad.gesture_end(),
                TraceEvent::Clear => pad.clear(),
            }
        }
    }

    /// Built-in demo: one smooth stroke across the default canvas, enough
    /// to exercise every pipeline stage without a trace file.
    pub fn demo_stroke() -> Self {
        let mut events = vec![TraceEvent::Down { x: 20.0, y: 20.0 }];
        for i in 1..=40 {
            let t = i as f32 / 40.0;
            events.push(TraceEvent::Move {
                x: 20.0 + 200.0 * t,
                y: 20.0 + 200.0 * t,
            });
        }
        events.push(TraceEvent::Up);
        Self { events }
    }
}
