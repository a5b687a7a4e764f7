pub mod catalog; // class labels and metric lookup
pub mod classifier; // inference runtime seam (tract ONNX)
pub mod error;
pub mod pipeline;
pub mod preprocessor;
pub mod registry;

#[cfg(test)]
pub mod testing;

pub use error::PipelineError;
pub use pipeline::{PredictionPipeline, PredictionResult};
pub use registry::ModelRegistry;
