//! Service layer: upload intake, classification, analysis workflow

pub mod classifier;
pub mod study_analyzer;
pub mod upload_intake;

pub use classifier::{Classifier, ClassifierError, MockClassifier};
pub use study_analyzer::{AnalysisError, AnalysisOutcome, AnalysisStatus, StudyAnalyzer};
pub use upload_intake::{ImageFormat, IncomingFile, UploadError, UploadIntake, UploadReceipt};
