mod config;
mod handlers;
mod models;
mod server;
mod services;

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::sync::Arc;

use config::Settings;
use server::{create_router, AppState};
use services::{ModelRegistry, PredictionPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before the logger so RUST_LOG from .env applies
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting image classification API...");

    let settings = Settings::from_env()?;
    log::info!(
        "📁 Models dir: {} | enabled: {:?} | default: {}",
        settings.models_dir.display(),
        settings.enabled_models,
        settings.default_model
    );

    // Blocking file reads and graph optimization; done once before serving
    let registry = {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || ModelRegistry::load(&settings)).await??
    };
    log::info!("✅ Model registry ready: {:?}", registry.kinds());

    let state = AppState {
        pipeline: Arc::new(PredictionPipeline::new(registry)),
        default_model: settings.default_model,
        welcome_message: settings.welcome_message.clone(),
    };
    let app = create_router(state, settings.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    log::info!("🌐 Listening on http://{}", settings.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    log::info!("🛑 Shut down, models released");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
