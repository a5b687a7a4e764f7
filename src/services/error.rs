use crate::models::ModelKind;

/// Failures of a single prediction request.
///
/// None of these are retried. `is_client_error` separates malformed uploads
/// from deployment defects such as a model/catalog mismatch.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("model '{0}' is not registered")]
    UnknownModelKey(ModelKind),

    #[error("no file provided")]
    NoFileProvided,

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("class index {index} out of range for '{model}' ({len} labels)")]
    IndexOutOfRange {
        model: ModelKind,
        index: usize,
        len: usize,
    },

    #[error("model '{model}' produced {actual} scores but catalog has {expected} labels")]
    CatalogMismatch {
        model: ModelKind,
        expected: usize,
        actual: usize,
    },
}

impl PipelineError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownModelKey(_)
                | PipelineError::NoFileProvided
                | PipelineError::Decode(_)
                | PipelineError::UnsupportedFormat(_)
        )
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => PipelineError::UnsupportedFormat(e.to_string()),
            other => PipelineError::Decode(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(PipelineError::NoFileProvided.is_client_error());
        assert!(PipelineError::UnknownModelKey(ModelKind::Gym).is_client_error());
        assert!(PipelineError::Decode("bad".into()).is_client_error());
        assert!(!PipelineError::Inference("shape".into()).is_client_error());
        assert!(!PipelineError::IndexOutOfRange {
            model: ModelKind::Foods,
            index: 12,
            len: 12,
        }
        .is_client_error());
    }
}
