//! Upload intake
//!
//! Validates an uploaded image, stores its bytes under the upload directory
//! and records a new study. Validation runs before any side effect:
//! 1. file type (declared content type, or extension when undeclared)
//! 2. size ceiling
//!
//! Bytes are written before the study row. If the row cannot be created the
//! file stays on disk; the failure is logged and surfaced as a server error.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::db::studies;
use crate::models::NewStudy;

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Dicom,
}

impl ImageFormat {
    /// Canonical MIME type stored with the study
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Dicom => "application/dicom",
        }
    }

    /// Extension used for the stored file
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Dicom => "dcm",
        }
    }

    pub fn from_mime(content_type: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=binary"
        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "application/dicom" => Some(ImageFormat::Dicom),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "dcm" | "dicom" => Some(ImageFormat::Dicom),
            _ => None,
        }
    }

    /// Declared content type wins; the extension is consulted only when the
    /// client sent no specific type.
    pub fn detect(content_type: Option<&str>, filename: &str) -> Option<Self> {
        match content_type.map(str::trim) {
            Some(ct) if !ct.is_empty() && !ct.eq_ignore_ascii_case("application/octet-stream") => {
                Self::from_mime(ct)
            }
            _ => Self::from_filename(filename),
        }
    }
}

/// Upload rejected or failed
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type '{content_type}'. Supported types: image/png, image/jpeg, application/dicom")]
    InvalidFileType { content_type: String },

    #[error("File too large. Maximum size is {} MB", .max_bytes / (1024 * 1024))]
    FileTooLarge { size: u64, max_bytes: u64 },

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Failed to save uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to record study: {0}")]
    Store(#[from] mammo_common::Error),
}

/// File received from a client
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Result of a successful upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub study_id: String,
    pub filename: String,
    pub file_size: u64,
    pub content_type: String,
    pub upload_time: DateTime<Utc>,
    pub status: &'static str,
}

/// Validates and stores uploads
#[derive(Clone)]
pub struct UploadIntake {
    db: SqlitePool,
    upload_dir: PathBuf,
    max_bytes: u64,
}

impl UploadIntake {
    pub fn new(db: SqlitePool, upload_dir: PathBuf, max_bytes: u64) -> Self {
        Self {
            db,
            upload_dir,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check type, then size; no side effects
    pub fn validate(&self, file: &IncomingFile) -> Result<ImageFormat, UploadError> {
        let format = ImageFormat::detect(file.content_type.as_deref(), &file.filename).ok_or_else(
            || UploadError::InvalidFileType {
                content_type: file
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            },
        )?;

        let size = file.bytes.len() as u64;
        if size > self.max_bytes {
            return Err(UploadError::FileTooLarge {
                size,
                max_bytes: self.max_bytes,
            });
        }
        if size == 0 {
            return Err(UploadError::EmptyFile);
        }

        Ok(format)
    }

    /// Validate, store bytes, create the study record
    pub async fn accept(&self, file: IncomingFile) -> Result<UploadReceipt, UploadError> {
        let format = self.validate(&file)?;

        let study_id = mammo_common::uuid_utils::new_study_id();
        let file_path = self
            .upload_dir
            .join(format!("{}.{}", study_id, format.extension()));
        let filename = client_filename(&file.filename, &study_id, format);
        let file_size = file.bytes.len() as u64;

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::write(&file_path, &file.bytes).await?;

        let new_study = NewStudy {
            study_id: study_id.clone(),
            filename: filename.clone(),
            file_path: file_path.to_string_lossy().into_owned(),
            content_type: format.mime().to_string(),
            file_size: file_size as i64,
        };

        let record = studies::create_study(&self.db, &new_study)
            .await
            .map_err(|e| {
                error!(
                    study_id = %study_id,
                    file = %file_path.display(),
                    "Stored upload bytes but failed to record study: {}",
                    e
                );
                UploadError::Store(e)
            })?;

        info!(study_id = %study_id, size = file_size, content_type = format.mime(), "File uploaded");

        Ok(UploadReceipt {
            study_id: record.study_id,
            filename: record.filename,
            file_size,
            content_type: record.content_type,
            upload_time: record.created_at,
            status: "uploaded",
        })
    }
}

/// Client-supplied name without directory components
fn client_filename(raw: &str, study_id: &str, format: ImageFormat) -> String {
    Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}.{}", study_id, format.extension()))
}
