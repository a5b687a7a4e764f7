use anyhow::{Context, Result};
use std::path::Path;
use tract_onnx::prelude::*;

use super::error::PipelineError;
use super::preprocessor::{ImageTensor, CHANNELS, INPUT_SIZE};

/// Opaque pretrained classifier: one forward pass per call, no mutable state.
///
/// Implementations must be callable from many requests at once.
pub trait Classifier: Send + Sync {
    fn infer(&self, tensor: &ImageTensor) -> Result<Vec<f32>, PipelineError>;

    /// Length of the score vector, when the runtime can tell before running.
    fn num_classes(&self) -> Option<usize>;
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX model executed with tract.
pub struct OnnxClassifier {
    plan: OnnxPlan,
    num_classes: Option<usize>,
}

impl OnnxClassifier {
    pub fn load(path: &Path) -> Result<Self> {
        log::debug!("📦 Loading ONNX model from {}", path.display());

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .with_context(|| format!("failed to read ONNX model {}", path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, INPUT_SIZE, INPUT_SIZE, CHANNELS),
                ),
            )?
            .into_optimized()
            .with_context(|| format!("failed to optimize ONNX model {}", path.display()))?;

        let num_classes = model
            .output_fact(0)?
            .shape
            .as_concrete()
            .and_then(|dims| dims.last().copied());

        let plan = model.into_runnable()?;

        Ok(Self { plan, num_classes })
    }
}

impl Classifier for OnnxClassifier {
    fn infer(&self, tensor: &ImageTensor) -> Result<Vec<f32>, PipelineError> {
        let [n, h, w, c] = tensor.shape();
        let input = tract_ndarray::Array4::from_shape_vec((n, h, w, c), tensor.data().to_vec())
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into_tensor().into()))
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        let first = outputs
            .first()
            .ok_or_else(|| PipelineError::Inference("model produced no outputs".to_string()))?;
        let scores = first
            .to_array_view::<f32>()
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        Ok(scores.iter().copied().collect())
    }

    fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::preprocessor::preprocess;
    use crate::services::testing::{fixture, solid_png};

    /// `testdata/channel_mean.onnx` averages each channel of an NHWC input.
    fn channel_mean() -> OnnxClassifier {
        OnnxClassifier::load(&fixture("channel_mean.onnx")).unwrap()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len(), "{:?}", actual);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-4, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_static_output_size_is_reported() {
        assert_eq!(channel_mean().num_classes(), Some(3));
    }

    #[test]
    fn test_infer_runs_onnx_graph_on_nhwc_tensor() {
        let classifier = channel_mean();

        let magenta = preprocess(&solid_png([255, 0, 255])).unwrap();
        assert_close(&classifier.infer(&magenta).unwrap(), &[1.0, 0.0, 1.0]);

        let green = preprocess(&solid_png([0, 255, 0])).unwrap();
        assert_close(&classifier.infer(&green).unwrap(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_model_file_is_reported() {
        let err = match OnnxClassifier::load(Path::new("does/not/exist_model.onnx")) {
            Ok(_) => panic!("loading a missing model must fail"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("exist_model.onnx"));
    }
}
