//! Prediction trigger
//!
//! The debounced gesture-end handler: closes the open stroke, preprocesses
//! the visible raster, and submits the result to the classifier worker.
//! The guard rails live here. A trigger run that finds no open gesture is
//! a no-op, so the duplicate end events a pointer burst produces cannot
//! run the pipeline twice; an empty session or an inkless surface short
//! circuits before preprocessing; and while the classifier is still
//! loading the run is skipped and logged rather than queued.

use crossbeam_channel::Sender;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::canvas::Canvas;
use crate::classify::worker::PredictRequest;
use crate::preprocess::{frame_to_tensor, PreprocessConfig, PreprocessError};
use crate::shared::PadState;

pub struct PredictionTrigger {
    canvas: Arc<RwLock<Canvas>>,
    state: Arc<RwLock<PadState>>,
    requests: Sender<PredictRequest>,
    preprocess: PreprocessConfig,
}

impl PredictionTrigger {
    pub fn new(
        canvas: Arc<RwLock<Canvas>>,
        state: Arc<RwLock<PadState>>,
        requests: Sender<PredictRequest>,
        preprocess: PreprocessConfig,
    ) -> Self {
        Self {
            canvas,
            state,
            requests,
            preprocess,
        }
    }

    /// Runs the gesture-end pipeline once. Called from the debouncer, so a
    /// burst of end events reaches this at most twice and only the first
    /// run finds the gesture still open.
    pub fn on_gesture_end(&self) {
        // The generation is allocated under the same canvas lock as the
        // snapshot. A concurrent clear therefore lands either before this
        // block, where the session is already wiped and the run stops, or
        // after it, where its fence covers the generation and the result
        // is discarded on arrival.
        let (snapshot, generation) = {
            let mut canvas = self.canvas.write();
            if !canvas.session().is_drawing() {
                return;
            }
            canvas.end_stroke();
            if canvas.session().is_empty() {
                return;
            }
            let generation = self.state.write().begin_request();
            (canvas.surface().clone(), generation)
        };

        {
            let state = self.state.read();
            if !state.is_classifier_ready() {
                warn!(
                    progress = state.loading_progress(),
                    "prediction skipped: classifier not ready"
                );
                return;
            }
        }

        let tensor = match frame_to_tensor(&snapshot, &self.preprocess) {
            Ok(tensor) => tensor,
            // A session of bare single-point strokes leaves no ink.
            Err(PreprocessError::EmptyFrame) => {
                debug!("prediction skipped: no ink on surface");
                return;
            }
        };

        debug!(generation, "submitting prediction request");
        if self
            .requests
            .send(PredictRequest { generation, input: tensor })
            .is_err()
        {
            warn!("prediction dropped: classifier worker is gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::testing::{one_hot, ScriptedClassifier};
    use crate::classify::worker::ClassifierWorker;
    use crate::input::Point;
    use std::sync::atomic::Ordering;
    use std::time::{Duration, Instant};

    struct Fixture {
        canvas: Arc<RwLock<Canvas>>,
        state: Arc<RwLock<PadState>>,
        trigger: PredictionTrigger,
        _worker: ClassifierWorker,
    }

    fn fixture(engine: ScriptedClassifier) -> Fixture {
        let state = Arc::new(RwLock::new(PadState::new()));
        let worker = ClassifierWorker::spawn_with_engine(Box::new(engine), state.clone());
        let canvas = Arc::new(RwLock::new(Canvas::new(240, 240)));
        let trigger = PredictionTrigger::new(
            canvas.clone(),
            state.clone(),
            worker.sender(),
            PreprocessConfig::default(),
        );
        Fixture {
            canvas,
            state,
            trigger,
            _worker: worker,
        }
    }

    fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn wait_ready(state: &Arc<RwLock<PadState>>) {
        assert!(wait_until(Duration::from_secs(1), || {
            state.read().is_classifier_ready()
        }));
    }

    fn draw_diagonal(canvas: &Arc<RwLock<Canvas>>) {
        let mut canvas = canvas.write();
        canvas.begin_stroke(Point::new(20.0, 20.0));
        canvas.extend_stroke(Point::new(120.0, 120.0));
        canvas.extend_stroke(Point::new(220.0, 220.0));
    }

    #[test]
    fn test_gesture_end_submits_one_prediction() {
        let engine = ScriptedClassifier::fixed(one_hot(4));
        let calls = engine.call_counter();
        let fx = fixture(engine);
        wait_ready(&fx.state);

        draw_diagonal(&fx.canvas);
        fx.trigger.on_gesture_end();

        assert!(wait_until(Duration::from_secs(1), || {
            fx.state.read().predicted_class() == Some(4)
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_end_events_run_pipeline_once() {
        let engine = ScriptedClassifier::fixed(one_hot(1));
        let calls = engine.call_counter();
        let fx = fixture(engine);
        wait_ready(&fx.state);

        draw_diagonal(&fx.canvas);
        // The same burst can reach the trigger more than once; only the
        // first run finds the gesture open.
        fx.trigger.on_gesture_end();
        fx.trigger.on_gesture_end();
        fx.trigger.on_gesture_end();

        assert!(wait_until(Duration::from_secs(1), || {
            fx.state.read().predicted_class() == Some(1)
        }));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_end_without_gesture_is_a_noop() {
        let engine = ScriptedClassifier::fixed(one_hot(0));
        let calls = engine.call_counter();
        let fx = fixture(engine);
        wait_ready(&fx.state);

        fx.trigger.on_gesture_end();

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.state.read().predicted_class(), None);
    }

    #[test]
    fn test_inkless_gesture_is_skipped() {
        let engine = ScriptedClassifier::fixed(one_hot(0));
        let calls = engine.call_counter();
        let fx = fixture(engine);
        wait_ready(&fx.state);

        // A single-point stroke never paints.
        fx.canvas.write().begin_stroke(Point::new(100.0, 100.0));
        fx.trigger.on_gesture_end();

        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_not_ready_classifier_drops_the_run() {
        let state = Arc::new(RwLock::new(PadState::new()));
        // No worker marks this state ready.
        let (sender, receiver) = crossbeam_channel::unbounded();
        let canvas = Arc::new(RwLock::new(Canvas::new(240, 240)));
        let trigger = PredictionTrigger::new(
            canvas.clone(),
            state.clone(),
            sender,
            PreprocessConfig::default(),
        );

        draw_diagonal(&canvas);
        trigger.on_gesture_end();

        assert!(receiver.is_empty());
        assert_eq!(state.read().predicted_class(), None);
        // The gesture itself still closed normally.
        assert!(!canvas.read().session().is_drawing());
    }

    #[test]
    fn test_clear_racing_gesture_end_leaves_pad_blank() {
        // Land a clear at staggered points inside a running gesture-end
        // pipeline. Whichever side wins the canvas lock, the pad must come
        // out blank: a late clear fences the generation the snapshot was
        // tagged with, an early one leaves nothing for the run to submit.
        for clear_delay_us in [0u64, 20, 50, 100, 200, 500, 1000, 2000] {
            let engine = ScriptedClassifier::fixed(one_hot(7));
            let fx = fixture(engine);
            wait_ready(&fx.state);
            draw_diagonal(&fx.canvas);

            let trigger = fx.trigger;
            let gesture = std::thread::spawn(move || trigger.on_gesture_end());
            std::thread::sleep(Duration::from_micros(clear_delay_us));
            // The canvas and state half of a pad clear.
            fx.canvas.write().clear();
            fx.state.write().invalidate_pending();
            gesture.join().unwrap();

            // Dropping the worker joins its thread, so any request the
            // gesture still managed to submit has been served here.
            drop(fx._worker);
            assert_eq!(
                fx.state.read().predicted_class(),
                None,
                "stale prediction shown after a clear delayed {clear_delay_us}us"
            );
            assert!(fx
                .canvas
                .read()
                .surface()
                .pixels()
                .all(|pixel| pixel.0[3] == 0));
        }
    }
}
