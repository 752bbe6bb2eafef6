//! Data models for mammo-api

pub mod analysis;
pub mod study;

pub use analysis::{Classification, ModelInfo, Prediction, Region};
pub use study::{NewStudy, StudyAnalysis, StudyRecord};
