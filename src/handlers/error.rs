use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::PipelineError;

/// Everything a prediction route can answer with besides a result.
#[derive(Debug)]
pub enum ApiError {
    NoFilePart,
    NoSelectedFile,
    InvalidModelType,
    /// Body broke off or exceeded the upload limit mid-stream.
    Multipart(MultipartError),
    Pipeline(PipelineError),
    Internal(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NoFilePart => (StatusCode::BAD_REQUEST, "No file part"),
            ApiError::NoSelectedFile => (StatusCode::BAD_REQUEST, "No selected file"),
            ApiError::InvalidModelType => (StatusCode::BAD_REQUEST, "Invalid model type"),
            ApiError::Pipeline(err) => match err {
                PipelineError::UnknownModelKey(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid model type")
                }
                PipelineError::NoFileProvided => (StatusCode::BAD_REQUEST, "No selected file"),
                PipelineError::Decode(_) | PipelineError::UnsupportedFormat(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid image file")
                }
                PipelineError::Inference(_)
                | PipelineError::IndexOutOfRange { .. }
                | PipelineError::CatalogMismatch { .. } => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            },
            ApiError::Multipart(err) => (err.status(), "Could not read upload"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        match &self {
            ApiError::Pipeline(err) if !err.is_client_error() => {
                log::error!("❌ Prediction failed: {}", err);
            }
            ApiError::Internal(detail) => log::error!("❌ Prediction failed: {}", detail),
            ApiError::Multipart(err) => log::warn!("⚠️ Malformed multipart body: {}", err),
            ApiError::Pipeline(err) => log::warn!("⚠️ Rejected upload: {}", err),
            _ => log::warn!("⚠️ Rejected request: {}", message),
        }

        (status, message).into_response()
    }
}
