//! Observable pad state
//!
//! The only window the embedding layer gets into the pipeline: loading
//! progress, the latest confidence distribution, the derived predicted
//! class, and the last error. Generation bookkeeping lives here too, so a
//! result arriving late for a superseded gesture or a cleared session is
//! dropped instead of shown.

use crate::classify::OutputDistribution;

/// Shared observable state, kept behind `Arc<RwLock<..>>` by the pad.
#[derive(Debug, Default)]
pub struct PadState {
    loading_progress: u8,
    classifier_ready: bool,
    last_error: Option<String>,
    output: OutputDistribution,
    next_generation: u64,
    applied_generation: u64,
}

impl PadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model readiness, 0-100
    pub fn loading_progress(&self) -> u8 {
        self.loading_progress
    }

    pub fn set_loading_progress(&mut self, pct: u8) {
        self.loading_progress = pct.min(100);
    }

    /// Marks the classifier loaded and the progress complete.
    pub fn mark_ready(&mut self) {
        self.loading_progress = 100;
        self.classifier_ready = true;
    }

    /// Whether predictions can be served
    pub fn is_classifier_ready(&self) -> bool {
        self.classifier_ready
    }

    /// Last recorded failure, if any
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Latest distribution; all zeros before the first prediction
    pub fn output(&self) -> &OutputDistribution {
        &self.output
    }

    /// Highest-confidence class, None until a prediction has landed
    pub fn predicted_class(&self) -> Option<usize> {
        self.output.predicted_class()
    }

    /// Allocates the generation tag for a request being submitted.
    /// Generations are strictly increasing for the life of the pad.
    pub fn begin_request(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Stores `output` unless something newer already landed. Returns
    /// whether the result was applied.
    pub fn apply_prediction(&mut self, generation: u64, output: OutputDistribution) -> bool {
        if generation <= self.applied_generation {
            return false;
        }
        self.applied_generation = generation;
        self.output = output;
        true
    }

    /// Zeroes the output and fences out every outstanding request. Results
    /// for generations issued before this call are discarded on arrival.
    pub fn invalidate_pending(&mut self) {
        self.next_generation += 1;
        self.applied_generation = self.next_generation;
        self.output = OutputDistribution::default();
    }
}
