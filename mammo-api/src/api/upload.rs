//! Upload API handlers
//!
//! POST /upload, GET /upload/:study_id

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::studies;
use crate::error::{ApiError, ApiResult};
use crate::services::{IncomingFile, UploadError};
use crate::AppState;

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

/// POST /upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub study_id: String,
    pub filename: String,
    pub file_size: u64,
    pub content_type: String,
    pub upload_time: DateTime<Utc>,
    pub status: String,
    pub message: String,
}

/// GET /upload/:study_id response
#[derive(Debug, Serialize)]
pub struct UploadStatusResponse {
    pub study_id: String,
    pub status: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    pub upload_time: DateTime<Utc>,
    pub has_analysis: bool,
}

/// POST /upload
///
/// Accepts a multipart body with a `file` field.
pub async fn upload_study(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let intake = state.intake();
    let to_api_error = |e: MultipartError| multipart_error(e, intake.max_bytes());

    let mut incoming = None;
    while let Some(field) = multipart.next_field().await.map_err(to_api_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(to_api_error)?;
        incoming = Some(IncomingFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let incoming = incoming.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field '{}'", FILE_FIELD))
    })?;

    let receipt = match intake.accept(incoming).await {
        Ok(receipt) => receipt,
        Err(e) => {
            match e {
                UploadError::Io(_) => state.record_error("upload: file write failed").await,
                UploadError::Store(_) => state.record_error("upload: store write failed").await,
                _ => {}
            }
            return Err(e.into());
        }
    };

    Ok(Json(UploadResponse {
        study_id: receipt.study_id,
        filename: receipt.filename,
        file_size: receipt.file_size,
        content_type: receipt.content_type,
        upload_time: receipt.upload_time,
        status: receipt.status.to_string(),
        message: "File uploaded successfully. Use study_id for AI analysis.".to_string(),
    }))
}

/// GET /upload/:study_id
pub async fn get_upload_status(
    State(state): State<AppState>,
    Path(study_id): Path<String>,
) -> ApiResult<Json<UploadStatusResponse>> {
    let study = studies::get_study(&state.db, &study_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Study not found".to_string()))?;

    Ok(Json(UploadStatusResponse {
        has_analysis: study.is_analyzed(),
        study_id: study.study_id,
        status: "uploaded".to_string(),
        filename: study.filename,
        content_type: study.content_type,
        file_size: study.file_size,
        upload_time: study.created_at,
    }))
}

/// Bodies over the transport limit are reported as oversized uploads
fn multipart_error(err: MultipartError, max_bytes: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::from(UploadError::FileTooLarge {
            size: max_bytes.saturating_add(1),
            max_bytes,
        })
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_study))
        .route("/upload/:study_id", get(get_upload_status))
}
