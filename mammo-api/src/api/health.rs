//! Health check endpoints
//!
//! GET /health is a plain liveness answer. GET /health/detailed probes the
//! database and the classifier; probe failures become field values and never
//! fail the request.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::db::studies;
use crate::models::ModelInfo;
use crate::AppState;

const SERVICE_NAME: &str = "mammo-api";

const HEALTHY: &str = "healthy";
const UNHEALTHY: &str = "unhealthy";
const DEGRADED: &str = "degraded";

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
}

/// Per-component probe results
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: String,
    pub classifier: String,
}

/// Detailed health response
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    /// "healthy" only when every component is healthy, else "degraded"
    pub status: String,
    pub components: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_info: Option<ModelInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_count: Option<i64>,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Last server-side failure, for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

fn uptime_seconds(state: &AppState) -> u64 {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    uptime.num_seconds().max(0) as u64
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTHY.to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(&state),
    })
}

/// GET /health/detailed
pub async fn detailed_health_check(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let (database, study_count) = match studies::ping(&state.db).await {
        Ok(()) => (HEALTHY, studies::count_studies(&state.db).await.ok()),
        Err(e) => {
            error!("Database health check failed: {}", e);
            (UNHEALTHY, None)
        }
    };

    let (classifier, model_info) = match state.classifier.model_info() {
        Ok(info) => (HEALTHY, Some(info)),
        Err(e) => {
            error!("Classifier health check failed: {}", e);
            (UNHEALTHY, None)
        }
    };

    let status = if database == HEALTHY && classifier == HEALTHY {
        HEALTHY
    } else {
        DEGRADED
    };

    Json(DetailedHealthResponse {
        status: status.to_string(),
        components: ComponentStatus {
            database: database.to_string(),
            classifier: classifier.to_string(),
        },
        model_info,
        study_count,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime_seconds(&state),
        last_error: state.last_error.read().await.clone(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
}
