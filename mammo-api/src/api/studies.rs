//! Study listing
//!
//! GET /studies?limit=N

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::studies;
use crate::error::ApiResult;
use crate::models::StudyRecord;
use crate::AppState;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListStudiesQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListStudiesResponse {
    pub studies: Vec<StudyRecord>,
    pub count: usize,
}

/// GET /studies
///
/// Most recently uploaded first. `limit` is clamped to 1..=1000.
pub async fn list_studies(
    State(state): State<AppState>,
    Query(query): Query<ListStudiesQuery>,
) -> ApiResult<Json<ListStudiesResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let studies = studies::list_studies(&state.db, limit).await?;

    Ok(Json(ListStudiesResponse {
        count: studies.len(),
        studies,
    }))
}

/// Build study routes
pub fn study_routes() -> Router<AppState> {
    Router::new().route("/studies", get(list_studies))
}
