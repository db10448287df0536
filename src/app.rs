//! Pad coordinator
//!
//! Owns every moving part: the canvas, the debounced prediction trigger,
//! the classifier worker, and the shared observable state. The embedding
//! layer only sees pointer handlers, clear, and the state handle; wiring
//! and thread lifetimes stay in here.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::canvas::Canvas;
use crate::classify::worker::ClassifierWorker;
use crate::classify::DigitClassifier;
use crate::config::AppConfig;
use crate::debounce::Debouncer;
use crate::input::{CanvasRect, PointerInput};
use crate::preprocess::PreprocessConfig;
use crate::shared::PadState;
use crate::trigger::PredictionTrigger;

pub struct DigitPad {
    config: AppConfig,
    canvas: Arc<RwLock<Canvas>>,
    state: Arc<RwLock<PadState>>,
    // Declared before the worker: the debouncer joins first on drop,
    // releasing its trigger's request sender so the worker loop can end.
    debouncer: Debouncer,
    _worker: ClassifierWorker,
}

impl DigitPad {
    /// Builds the pad and starts loading the configured model in the
    /// background. The pad is usable immediately; predictions begin once
    /// loading progress reaches 100.
    pub fn new(config: AppConfig) -> Self {
        let state = Arc::new(RwLock::new(PadState::new()));
        let worker = ClassifierWorker::spawn(config.classifier.clone(), state.clone());
        Self::assemble(config, state, worker)
    }

    /// Same wiring around a caller-supplied engine, ready immediately.
    pub fn with_engine(config: AppConfig, engine: Box<dyn DigitClassifier>) -> Self {
        let state = Arc::new(RwLock::new(PadState::new()));
        let worker = ClassifierWorker::spawn_with_engine(engine, state.clone());
        Self::assemble(config, state, worker)
    }

    fn assemble(
        config: AppConfig,
        state: Arc<RwLock<PadState>>,
        worker: ClassifierWorker,
    ) -> Self {
        let canvas = Arc::new(RwLock::new(Canvas::new(
            config.canvas.width,
            config.canvas.height,
        )));

        let trigger = PredictionTrigger::new(
            canvas.clone(),
            state.clone(),
            worker.sender(),
            config.preprocess,
        );
        let debouncer = Debouncer::new(
            Duration::from_millis(config.trigger.quiescence_ms),
            move || trigger.on_gesture_end(),
        );

        info!(
            width = config.canvas.width,
            height = config.canvas.height,
            "digit pad ready for input"
        );
        Self {
            config,
            canvas,
            state,
            debouncer,
            _worker: worker,
        }
    }

    /// Gesture start handler
    pub fn pointer_down(&self, input: &PointerInput, rect: &CanvasRect) {
        let Some(point) = input.canvas_position(rect) else {
            return;
        };
        self.canvas.write().begin_stroke(point);
    }

    /// Gesture move handler; ignored while no gesture is open
    pub fn pointer_move(&self, input: &PointerInput, rect: &CanvasRect) {
        let Some(point) = input.canvas_position(rect) else {
            return;
        };
        self.canvas.write().extend_stroke(point);
    }

    /// Gesture end: pointer up, pointer leaving the canvas, or touch end.
    /// All of them funnel through the debouncer, so one gesture produces
    /// one pipeline run no matter how many end events the device emits.
    pub fn gesture_end(&self) {
        self.debouncer.call();
    }

    /// Clears strokes, raster, and output, and fences out any in-flight
    /// prediction so a stale result cannot resurface afterwards.
    pub fn clear(&self) {
        self.debouncer.cancel();
        self.canvas.write().clear();
        let mut state = self.state.write();
        state.invalidate_pending();
        state.clear_error();
        info!("canvas cleared");
    }

    /// Shared observable state handle
    pub fn state(&self) -> Arc<RwLock<PadState>> {
        self.state.clone()
    }

    /// Copy of the current raster, for previews and debugging
    pub fn surface_snapshot(&self) -> image::RgbaImage {
        self.canvas.read().surface().clone()
    }

    pub fn canvas_width(&self) -> u32 {
        self.config.canvas.width
    }

    pub fn canvas_height(&self) -> u32 {
        self.config.canvas.height
    }

    pub fn preprocess_config(&self) -> &PreprocessConfig {
        &self.config.preprocess
    }
}
