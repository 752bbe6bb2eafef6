//! Study record model
//!
//! A study is one uploaded image plus its optional analysis. The analysis
//! fields are grouped in [`StudyAnalysis`] so that a record is either fully
//! unanalyzed or fully analyzed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Classification;

/// Fields supplied when a study is first created
#[derive(Debug, Clone)]
pub struct NewStudy {
    pub study_id: String,
    pub filename: String,
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
}

/// Analysis written onto a study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyAnalysis {
    #[serde(flatten)]
    pub classification: Classification,
    /// When the analysis was written
    pub processed_at: DateTime<Utc>,
}

/// One persisted study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyRecord {
    pub study_id: String,
    pub filename: String,
    /// On-disk location; internal, never serialized to clients
    #[serde(skip_serializing)]
    pub file_path: String,
    pub content_type: String,
    pub file_size: i64,
    #[serde(flatten)]
    pub analysis: Option<StudyAnalysis>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudyRecord {
    pub fn is_analyzed(&self) -> bool {
        self.analysis.is_some()
    }
}
