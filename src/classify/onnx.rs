//! ONNX Runtime engine
//!
//! Wraps an `ort` session over a single-digit MNIST-style model. The
//! session is built the same way for any model file; tensor names and the
//! logits-versus-probabilities distinction come from configuration, so
//! swapping in a retrained model is a config edit, not a code change.

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use tracing::{debug, info};

use super::{softmax, ClassifierConfig, ClassifyError, DigitClassifier, OutputDistribution, CLASS_COUNT};
use crate::preprocess::InputTensor;

pub struct OnnxClassifier {
    session: Session,
    input_name: String,
    output_name: String,
    apply_softmax: bool,
}

impl OnnxClassifier {
    /// Builds the inference session from a local model file.
    pub fn load(model_path: &Path, config: &ClassifierConfig) -> Result<Self, ClassifyError> {
        info!("loading ONNX model from {:?}", model_path);

        let session = (|| {
            Session::builder()?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .with_intra_threads(config.intra_threads)?
                .commit_from_file(model_path)
        })()
        .map_err(ClassifyError::Load)?;

        let input_names: Vec<_> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let output_names: Vec<_> = session.outputs.iter().map(|o| o.name.clone()).collect();
        debug!(?input_names, ?output_names, "model loaded");

        Ok(Self {
            session,
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
            apply_softmax: config.apply_softmax,
        })
    }
}

impl DigitClassifier for OnnxClassifier {
    fn predict(&mut self, input: &InputTensor) -> Result<OutputDistribution, ClassifyError> {
        let value = Tensor::from_array(input.to_nchw()).map_err(ClassifyError::Inference)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => value])
            .map_err(ClassifyError::Inference)?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| ClassifyError::MissingOutput(self.output_name.clone()))?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(ClassifyError::Inference)?;

        if data.len() != CLASS_COUNT {
            return Err(ClassifyError::BadOutputShape {
                got: data.len(),
                expected: CLASS_COUNT,
            });
        }

        let mut scores = [0.0f32; CLASS_COUNT];
        scores.copy_from_slice(data);
        if self.apply_softmax {
            scores = softmax(scores);
        }
        Ok(OutputDistribution::new(scores))
    }
}
