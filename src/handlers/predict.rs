use axum::{
    extract::{multipart::{Multipart, MultipartRejection}, Path, State},
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use super::upload::read_image_field;
use crate::models::ModelKind;
use crate::server::AppState;
use crate::services::PredictionResult;

/// `POST /api/predict`, served by the configured default model.
pub async fn predict_default(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let kind = state.default_model;
    run_prediction(state, kind, multipart).await
}

/// `POST /api/:model_key`
pub async fn predict_with_model(
    Path(model_key): Path<String>,
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let kind: ModelKind = model_key.parse().map_err(|_| ApiError::InvalidModelType)?;
    if !state.pipeline.registry().contains(kind) {
        return Err(ApiError::InvalidModelType);
    }
    run_prediction(state, kind, multipart).await
}

async fn run_prediction(
    state: Arc<AppState>,
    kind: ModelKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let upload = read_image_field(multipart).await?;
    log::info!("📸 Prediction request for '{}': {}", kind, upload.file_name);

    // Decode and inference are CPU-bound; keep them off the async workers.
    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || pipeline.predict(kind, &upload.bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("prediction task failed: {}", e)))??;

    Ok(Json(result))
}
