use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::handlers::{predict_default, predict_with_model};
use crate::models::ModelKind;
use crate::services::PredictionPipeline;

pub struct AppState {
    pub pipeline: Arc<PredictionPipeline>,
    pub default_model: ModelKind,
    pub welcome_message: String,
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/api/predict", post(predict_default))
        .route("/api/:model_key", post(predict_with_model))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn root_handler(State(state): State<Arc<AppState>>) -> String {
    state.welcome_message.clone()
}

async fn health_check() -> &'static str {
    "OK"
}
