//! Inference API handlers
//!
//! POST /inference/:study_id, GET /inference/:study_id,
//! GET /inference/model/info

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{ModelInfo, StudyAnalysis};
use crate::services::{AnalysisError, AnalysisOutcome, AnalysisStatus};
use crate::AppState;

/// Inference response; analysis fields are flattened to the top level and
/// omitted while the study is unanalyzed
#[derive(Debug, Serialize)]
pub struct InferenceResponse {
    pub study_id: String,
    pub status: AnalysisStatus,
    pub message: String,
    #[serde(flatten)]
    pub analysis: Option<StudyAnalysis>,
}

impl From<AnalysisOutcome> for InferenceResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        let message = match outcome.status {
            AnalysisStatus::Analyzed => "AI analysis completed successfully",
            AnalysisStatus::AlreadyAnalyzed => "Study already analyzed; returning stored result",
            AnalysisStatus::NotAnalyzed => "Analysis not yet performed. Use POST to start analysis.",
        };

        Self {
            study_id: outcome.study_id,
            status: outcome.status,
            message: message.to_string(),
            analysis: outcome.analysis,
        }
    }
}

/// GET /inference/model/info response
#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_info: ModelInfo,
    pub status: String,
}

/// POST /inference/:study_id
///
/// Runs the classifier once per study; later calls return the stored result.
pub async fn analyze_study(
    State(state): State<AppState>,
    Path(study_id): Path<String>,
) -> ApiResult<Json<InferenceResponse>> {
    let outcome = match state.analyzer().analyze(&study_id).await {
        Ok(outcome) => outcome,
        Err(e) => {
            match e {
                AnalysisError::AnalysisFailed { .. } => {
                    state.record_error("inference: classifier failed").await
                }
                AnalysisError::Store(_) => state.record_error("inference: store read failed").await,
                _ => {}
            }
            return Err(e.into());
        }
    };

    if outcome.store_error.is_some() {
        state
            .record_error("inference: result not persisted")
            .await;
    }

    Ok(Json(outcome.into()))
}

/// GET /inference/:study_id
pub async fn get_analysis_result(
    State(state): State<AppState>,
    Path(study_id): Path<String>,
) -> ApiResult<Json<InferenceResponse>> {
    let outcome = state.analyzer().result(&study_id).await?;
    Ok(Json(outcome.into()))
}

/// GET /inference/model/info
pub async fn get_model_info(State(state): State<AppState>) -> ApiResult<Json<ModelInfoResponse>> {
    let model_info = state
        .classifier
        .model_info()
        .map_err(|e| ApiError::Internal(format!("Failed to get model info: {}", e)))?;

    Ok(Json(ModelInfoResponse {
        model_info,
        status: "available".to_string(),
    }))
}

/// Build inference routes
pub fn inference_routes() -> Router<AppState> {
    Router::new()
        .route("/inference/model/info", get(get_model_info))
        .route(
            "/inference/:study_id",
            get(get_analysis_result).post(analyze_study),
        )
}
