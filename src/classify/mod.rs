//! Classifier boundary
//!
//! The pipeline hands an intensity grid across this seam and gets back
//! per-class confidence scores. Engines implement [`DigitClassifier`]; the
//! rest of the crate depends on nothing else about them, so the stock ONNX
//! engine and the scripted test engines are interchangeable.

pub mod model;
pub mod onnx;
pub mod worker;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::preprocess::InputTensor;

pub use onnx::OnnxClassifier;

/// Number of output classes, digits 0-9
pub const CLASS_COUNT: usize = 10;

/// Inference failures
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed to load model: {0}")]
    Load(#[source] ort::Error),
    #[error("inference failed: {0}")]
    Inference(#[source] ort::Error),
    #[error("model has no output named {0:?}")]
    MissingOutput(String),
    #[error("model returned {got} scores, expected {expected}")]
    BadOutputShape { got: usize, expected: usize },
}

/// Classifier engine configuration: where the model lives and how to talk
/// to its graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Local model path; unset means the platform cache directory
    pub model_path: Option<PathBuf>,
    /// Download source used when the local file is missing
    pub model_url: Option<String>,
    /// Optional integrity pin for downloaded models (hex SHA-256)
    pub sha256: Option<String>,
    /// Graph input tensor name
    pub input_name: String,
    /// Graph output tensor name
    pub output_name: String,
    /// Apply softmax to the raw output (for models that emit logits)
    pub apply_softmax: bool,
    /// Intra-op thread count for the inference session
    pub intra_threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        // Tensor names of the ONNX model zoo MNIST convnet.
        Self {
            model_path: None,
            model_url: Some(model::DEFAULT_MODEL_URL.to_string()),
            sha256: None,
            input_name: "Input3".to_string(),
            output_name: "Plus214_Output_0".to_string(),
            apply_softmax: true,
            intra_threads: 2,
        }
    }
}

/// Per-class confidence scores, in class order 0-9.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputDistribution {
    scores: [f32; CLASS_COUNT],
}

impl Default for OutputDistribution {
    fn default() -> Self {
        Self {
            scores: [0.0; CLASS_COUNT],
        }
    }
}

impl OutputDistribution {
    pub fn new(scores: [f32; CLASS_COUNT]) -> Self {
        Self { scores }
    }

    pub fn scores(&self) -> &[f32; CLASS_COUNT] {
        &self.scores
    }

    /// Index of the highest score, lowest index winning ties. None while
    /// every score is exactly zero, the "no prediction yet" placeholder.
    pub fn predicted_class(&self) -> Option<usize> {
        if self.scores.iter().all(|&score| score == 0.0) {
            return None;
        }
        let mut best = 0;
        for (class, &score) in self.scores.iter().enumerate() {
            if score > self.scores[best] {
                best = class;
            }
        }
        Some(best)
    }
}

/// Inference engines the prediction trigger can drive. Engines may keep
/// mutable session state, hence the `&mut` receiver.
pub trait DigitClassifier: Send {
    fn predict(&mut self, input: &InputTensor) -> Result<OutputDistribution, ClassifyError>;
}

/// Standard softmax over the class scores, for models that emit logits.
pub fn softmax(scores: [f32; CLASS_COUNT]) -> [f32; CLASS_COUNT] {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = [0.0; CLASS_COUNT];
    let mut sum = 0.0;
    for (slot, score) in out.iter_mut().zip(scores) {
        *slot = (score - max).exp();
        sum += *slot;
    }
    for slot in &mut out {
        *slot /= sum;
    }
    out
}
