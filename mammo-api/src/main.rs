//! mammo-api - Mammogram upload and mock analysis service
//!
//! Accepts image uploads, records one study per image and returns mocked
//! classification results. See `GET /health/detailed` for component status.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mammo_common::config::RootFolderInitializer;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mammo_api::config::{Args, ServiceConfig};
use mammo_api::services::{Classifier, MockClassifier};
use mammo_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(&args).context("Failed to resolve configuration")?;

    // RUST_LOG wins over the resolved level (--log-level, then TOML)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting mammo-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    info!("Root folder: {}", config.root_folder.display());

    RootFolderInitializer::new(config.root_folder.clone())
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    std::fs::create_dir_all(&config.upload_dir).with_context(|| {
        format!("Failed to create upload directory {}", config.upload_dir.display())
    })?;
    info!("Upload directory: {}", config.upload_dir.display());

    info!("Database: {}", config.database_path.display());
    let db_pool = mammo_api::db::init_database(&config.database_path)
        .await
        .context("Failed to open database")?;
    info!("Database connection established");

    let classifier: Arc<dyn Classifier> = Arc::new(MockClassifier::new());
    let state = AppState::new(
        db_pool,
        classifier,
        config.upload_dir.clone(),
        config.max_upload_bytes,
    );
    let app = build_router(state);

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("mammo-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
