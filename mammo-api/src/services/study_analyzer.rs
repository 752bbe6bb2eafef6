//! Study analysis workflow
//!
//! A study moves from unanalyzed to analyzed exactly once. Asking to analyze
//! an analyzed study returns the stored result without running the
//! classifier again.
//!
//! The classifier run and the database write are not one transaction: when
//! the write fails the fresh result is still returned, flagged as not
//! persisted.

use serde::Serialize;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::classifier::{Classifier, ClassifierError};
use crate::db::studies;
use crate::models::StudyAnalysis;

/// Analysis state reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    NotAnalyzed,
    Analyzed,
    AlreadyAnalyzed,
}

/// Outcome of `analyze` or `result`
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub study_id: String,
    pub status: AnalysisStatus,
    pub analysis: Option<StudyAnalysis>,
    /// False when a fresh result could not be written back
    pub persisted: bool,
    /// Store failure behind `persisted == false`
    pub store_error: Option<String>,
}

/// Analysis failure
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Study not found: {0}")]
    NotFound(String),

    #[error("Image file not found for study {study_id}: {path}")]
    FileMissing { study_id: String, path: String },

    #[error("AI analysis failed for study {study_id}: {source}")]
    AnalysisFailed {
        study_id: String,
        #[source]
        source: ClassifierError,
    },

    #[error("Study store error: {0}")]
    Store(#[from] mammo_common::Error),
}

/// Runs the classifier against stored studies
#[derive(Clone)]
pub struct StudyAnalyzer {
    db: SqlitePool,
    classifier: Arc<dyn Classifier>,
}

impl StudyAnalyzer {
    pub fn new(db: SqlitePool, classifier: Arc<dyn Classifier>) -> Self {
        Self { db, classifier }
    }

    /// Analyze a study, or return its existing analysis
    pub async fn analyze(&self, study_id: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let study = studies::get_study(&self.db, study_id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound(study_id.to_string()))?;

        if let Some(existing) = study.analysis {
            info!(study_id = %study_id, "Study already analyzed; returning stored result");
            return Ok(AnalysisOutcome {
                study_id: study.study_id,
                status: AnalysisStatus::AlreadyAnalyzed,
                analysis: Some(existing),
                persisted: true,
                store_error: None,
            });
        }

        let path = PathBuf::from(&study.file_path);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            warn!(study_id = %study_id, file = %path.display(), "Image file missing");
            return Err(AnalysisError::FileMissing {
                study_id: study_id.to_string(),
                path: study.file_path,
            });
        }

        let classifier = Arc::clone(&self.classifier);
        let classify_path = path.clone();
        let classification = tokio::task::spawn_blocking(move || classifier.classify(&classify_path))
            .await
            .map_err(|e| ClassifierError::Inference(e.to_string()))
            .and_then(|result| result)
            .map_err(|source| {
                error!(study_id = %study_id, "AI analysis failed: {}", source);
                AnalysisError::AnalysisFailed {
                    study_id: study_id.to_string(),
                    source,
                }
            })?;

        match studies::update_analysis(&self.db, study_id, &classification).await {
            Ok(record) => {
                info!(
                    study_id = %study_id,
                    prediction = %classification.prediction,
                    confidence = classification.confidence,
                    "AI analysis completed"
                );
                Ok(AnalysisOutcome {
                    study_id: record.study_id,
                    status: AnalysisStatus::Analyzed,
                    analysis: record.analysis,
                    persisted: true,
                    store_error: None,
                })
            }
            Err(e) => {
                error!(study_id = %study_id, "Failed to store analysis result: {}", e);
                Ok(AnalysisOutcome {
                    study_id: study_id.to_string(),
                    status: AnalysisStatus::Analyzed,
                    analysis: Some(StudyAnalysis {
                        classification,
                        processed_at: mammo_common::time::now(),
                    }),
                    persisted: false,
                    store_error: Some(e.to_string()),
                })
            }
        }
    }

    /// Stored analysis, or `NotAnalyzed`; never runs the classifier
    pub async fn result(&self, study_id: &str) -> Result<AnalysisOutcome, AnalysisError> {
        let study = studies::get_study(&self.db, study_id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound(study_id.to_string()))?;

        let status = if study.is_analyzed() {
            AnalysisStatus::Analyzed
        } else {
            AnalysisStatus::NotAnalyzed
        };

        Ok(AnalysisOutcome {
            study_id: study.study_id,
            status,
            analysis: study.analysis,
            persisted: true,
            store_error: None,
        })
    }
}
