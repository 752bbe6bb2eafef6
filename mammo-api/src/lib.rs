//! mammo-api library interface
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::services::{Classifier, StudyAnalyzer, UploadIntake};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Injected classifier
    pub classifier: Arc<dyn Classifier>,
    /// Directory receiving uploaded images
    pub upload_dir: PathBuf,
    /// Upload size ceiling in bytes
    pub max_upload_bytes: u64,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Category and time of the last server-side failure, reported by the
    /// detailed health check
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        classifier: Arc<dyn Classifier>,
        upload_dir: PathBuf,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            db,
            classifier,
            upload_dir,
            max_upload_bytes,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn intake(&self) -> UploadIntake {
        UploadIntake::new(self.db.clone(), self.upload_dir.clone(), self.max_upload_bytes)
    }

    pub fn analyzer(&self) -> StudyAnalyzer {
        StudyAnalyzer::new(self.db.clone(), Arc::clone(&self.classifier))
    }

    /// Remember that a server-side failure happened
    ///
    /// Only the category and time are kept; the detail goes to the log at
    /// the failure site.
    pub async fn record_error(&self, category: &str) {
        let at = mammo_common::time::to_db_timestamp(&mammo_common::time::now());
        *self.last_error.write().await = Some(format!("{} at {}", category, at));
    }
}

/// Room for multipart framing on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .merge(api::upload_routes())
        .merge(api::inference_routes())
        .merge(api::study_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
