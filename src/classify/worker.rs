//! Classifier worker thread
//!
//! Owns the engine for the pad's lifetime. On spawn it resolves and loads
//! the model while publishing loading progress, then serves prediction
//! requests in arrival order. Results pass through the generation guard in
//! shared state, so a request superseded by a newer gesture or a clear can
//! never overwrite fresher output.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

use super::model::ensure_model;
use super::{ClassifierConfig, DigitClassifier, OnnxClassifier};
use crate::preprocess::InputTensor;
use crate::shared::PadState;

/// Share of the progress bar covered by the download; the rest is the
/// session build.
const DOWNLOAD_PROGRESS_CAP: u64 = 90;

/// One queued inference request
pub struct PredictRequest {
    pub generation: u64,
    pub input: InputTensor,
}

/// Handle to the background classification thread. Dropping it closes the
/// request channel and joins the thread.
pub struct ClassifierWorker {
    requests: Sender<PredictRequest>,
    handle: Option<JoinHandle<()>>,
}

impl ClassifierWorker {
    /// Spawns a worker that builds the ONNX engine described by `config`.
    pub fn spawn(config: ClassifierConfig, state: Arc<RwLock<PadState>>) -> Self {
        Self::spawn_with(state, move |state| load_engine(&config, state))
    }

    /// Spawns a worker around an already built engine. Readiness is
    /// immediate; used by tests and embedders with their own engines.
    pub fn spawn_with_engine(
        engine: Box<dyn DigitClassifier>,
        state: Arc<RwLock<PadState>>,
    ) -> Self {
        Self::spawn_with(state, move |_| Some(engine))
    }

    fn spawn_with<F>(state: Arc<RwLock<PadState>>, build: F) -> Self
    where
        F: FnOnce(&Arc<RwLock<PadState>>) -> Option<Box<dyn DigitClassifier>> + Send + 'static,
    {
        let (requests, receiver) = unbounded::<PredictRequest>();
        let handle = std::thread::spawn(move || {
            // Load failures are already recorded in shared state.
            let Some(engine) = build(&state) else {
                return;
            };
            state.write().mark_ready();
            info!("classifier ready");
            serve(engine, receiver, state);
        });
        Self {
            requests,
            handle: Some(handle),
        }
    }

    /// Sender for queueing prediction requests
    pub fn sender(&self) -> Sender<PredictRequest> {
        self.requests.clone()
    }
}

impl Drop for ClassifierWorker {
    fn drop(&mut self) {
        // Replacing the sender drops the last handle once triggers let go,
        // which ends the serve loop.
        let (stub, _) = unbounded();
        self.requests = stub;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("classifier worker panicked");
            }
        }
    }
}

fn load_engine(
    config: &ClassifierConfig,
    state: &Arc<RwLock<PadState>>,
) -> Option<Box<dyn DigitClassifier>> {
    let fetched = ensure_model(config, |downloaded, total| {
        let pct = match total {
            Some(total) if total > 0 => (downloaded * DOWNLOAD_PROGRESS_CAP / total)
                .min(DOWNLOAD_PROGRESS_CAP) as u8,
            // Unknown size: hold the bar mid-download.
            _ => (DOWNLOAD_PROGRESS_CAP / 2) as u8,
        };
        state.write().set_loading_progress(pct);
    });
    let path = match fetched {
        Ok(path) => path,
        Err(e) => {
            warn!("model fetch failed: {e:#}");
            state.write().set_error(format!("model fetch failed: {e:#}"));
            return None;
        }
    };
    state.write().set_loading_progress(DOWNLOAD_PROGRESS_CAP as u8);

    match OnnxClassifier::load(&path, config) {
        Ok(engine) => Some(Box::new(engine)),
        Err(e) => {
            warn!("model load failed: {e}");
            state.write().set_error(format!("model load failed: {e}"));
            None
        }
    }
}

fn serve(
    mut engine: Box<dyn DigitClassifier>,
    requests: Receiver<PredictRequest>,
    state: Arc<RwLock<PadState>>,
) {
    while let Ok(request) = requests.recv() {
        match engine.predict(&request.input) {
            Ok(output) => {
                let applied = state.write().apply_prediction(request.generation, output);
                if applied {
                    debug!(generation = request.generation, "prediction applied");
                } else {
                    debug!(generation = request.generation, "stale prediction discarded");
                }
            }
            Err(e) => {
                warn!("inference failed: {e}");
                state.write().set_error(format!("inference failed: {e}"));
            }
        }
    }
    debug!("classifier worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::testing::{one_hot, ScriptedClassifier};
    use std::time::{Duration, Instant};

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

    fn tensor() -> InputTensor {
        InputTensor::from_alpha(&image::RgbaImage::new(28, 28))
    }

    #[test]
    fn test_prebuilt_engine_is_ready_immediately() {
        let state = Arc::new(RwLock::new(PadState::new()));
        let _worker =
            ClassifierWorker::spawn_with_engine(Box::new(ScriptedClassifier::fixed(one_hot(3))), state.clone());

        assert!(wait_until(Duration::from_secs(1), || {
            state.read().is_classifier_ready()
        }));
        assert_eq!(state.read().loading_progress(), 100);
    }

    #[test]
    fn test_requests_update_shared_output() {
        let state = Arc::new(RwLock::new(PadState::new()));
        let engine = ScriptedClassifier::fixed(one_hot(5));
        let worker = ClassifierWorker::spawn_with_engine(Box::new(engine), state.clone());

        let generation = state.write().begin_request();
        worker
            .sender()
            .send(PredictRequest {
                generation,
                input: tensor(),
            })
            .unwrap();

        assert!(wait_until(Duration::from_secs(1), || {
            state.read().predicted_class() == Some(5)
        }));
    }

    #[test]
    fn test_requests_served_in_order_latest_wins() {
        let state = Arc::new(RwLock::new(PadState::new()));
        let engine = ScriptedClassifier::sequence(vec![one_hot(1), one_hot(2)])
            .with_delay(Duration::from_millis(30));
        let calls = engine.call_counter();
        let worker = ClassifierWorker::spawn_with_engine(Box::new(engine), state.clone());

        for _ in 0..2 {
            let generation = state.write().begin_request();
            worker
                .sender()
                .send(PredictRequest {
                    generation,
                    input: tensor(),
                })
                .unwrap();
        }

        assert!(wait_until(Duration::from_secs(2), || {
            calls.load(std::sync::atomic::Ordering::SeqCst) == 2
                && state.read().predicted_class() == Some(2)
        }));
    }

    #[test]
    fn test_cleared_session_discards_in_flight_result() {
        let state = Arc::new(RwLock::new(PadState::new()));
        let engine =
            ScriptedClassifier::fixed(one_hot(7)).with_delay(Duration::from_millis(50));
        let worker = ClassifierWorker::spawn_with_engine(Box::new(engine), state.clone());

        let generation = state.write().begin_request();
        worker
            .sender()
            .send(PredictRequest {
                generation,
                input: tensor(),
            })
            .unwrap();
        // Clear lands while inference is still sleeping.
        state.write().invalidate_pending();

        // The result for the dead generation never surfaces.
        assert!(!wait_until(Duration::from_millis(300), || {
            state.read().predicted_class().is_some()
        }));
    }

    #[test]
    fn test_failed_model_fetch_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClassifierConfig {
            model_path: Some(dir.path().join("missing.onnx")),
            model_url: None,
            ..ClassifierConfig::default()
        };
        let state = Arc::new(RwLock::new(PadState::new()));
        let _worker = ClassifierWorker::spawn(config, state.clone());

        assert!(wait_until(Duration::from_secs(1), || {
            state.read().last_error().is_some()
        }));
        assert!(!state.read().is_classifier_ready());
    }
}
