//! Image classifier seam
//!
//! The service talks to its classifier through the [`Classifier`] trait so a
//! real model can replace [`MockClassifier`] without touching the handlers.
//! The mock fabricates plausible results; it performs no image decoding.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

use crate::models::{Classification, ModelInfo, Prediction, Region};

/// Classifier failure
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Model cannot be reached or loaded
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// Model ran but produced no result
    #[error("inference failed: {0}")]
    Inference(String),
}

/// Synchronous image classifier
///
/// Implementations must return a structurally complete [`Classification`]
/// for any path; callers check that the file exists beforehand.
pub trait Classifier: Send + Sync {
    fn classify(&self, file_path: &Path) -> Result<Classification, ClassifierError>;

    fn model_info(&self) -> Result<ModelInfo, ClassifierError>;
}

pub const MOCK_MODEL_VERSION: &str = "mock-mammo-1.0.0";

const LESION_TYPES: [&str; 4] = ["mass", "calcification", "architectural_distortion", "asymmetry"];
const SEVERITIES: [&str; 3] = ["low", "moderate", "high"];
const IMAGE_QUALITIES: [&str; 3] = ["excellent", "good", "adequate"];

/// Probability that the mock reports a suspicious finding
const SUSPICIOUS_RATE: f64 = 0.3;

/// Stand-in classifier producing random but well-formed results
pub struct MockClassifier {
    rng: Mutex<StdRng>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible output for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn fabricate(rng: &mut StdRng) -> Classification {
        let suspicious = rng.gen_bool(SUSPICIOUS_RATE);

        let (prediction, confidence, regions) = if suspicious {
            let count = rng.gen_range(1..=3);
            let regions = (1..=count).map(|i| fabricate_region(rng, i)).collect();
            (Prediction::Suspicious, rng.gen_range(0.60..0.95), regions)
        } else {
            (Prediction::Normal, rng.gen_range(0.75..0.98), Vec::new())
        };

        Classification {
            prediction,
            confidence: round3(confidence),
            processing_time: round3(rng.gen_range(0.8..2.5)),
            regions,
            model_version: MOCK_MODEL_VERSION.to_string(),
            image_quality: pick(rng, &IMAGE_QUALITIES).to_string(),
        }
    }
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, file_path: &Path) -> Result<Classification, ClassifierError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ClassifierError::Inference("random source poisoned".to_string()))?;

        let result = Self::fabricate(&mut rng);
        tracing::debug!(
            file = %file_path.display(),
            prediction = %result.prediction,
            "Mock classification produced"
        );
        Ok(result)
    }

    fn model_info(&self) -> Result<ModelInfo, ClassifierError> {
        Ok(ModelInfo {
            model_version: MOCK_MODEL_VERSION.to_string(),
            model_type: "mock".to_string(),
            supported_formats: vec!["png".to_string(), "jpeg".to_string(), "dicom".to_string()],
            lesion_types: LESION_TYPES.iter().map(|s| s.to_string()).collect(),
            description: "Mock mammography classifier for demonstration only; \
                          results are randomly generated"
                .to_string(),
        })
    }
}

fn fabricate_region(rng: &mut StdRng, index: usize) -> Region {
    let kind = pick(rng, &LESION_TYPES);
    let severity = pick(rng, &SEVERITIES);

    Region {
        id: format!("region_{}", index),
        x: rng.gen_range(0..1800),
        y: rng.gen_range(0..2200),
        width: rng.gen_range(40..240),
        height: rng.gen_range(40..240),
        confidence: round3(rng.gen_range(0.5..0.95)),
        kind: kind.to_string(),
        severity: Some(severity.to_string()),
        description: Some(format!("{} {} finding", severity, kind.replace('_', " "))),
    }
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

/// Three decimals keep values exact through JSON round trips
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_are_structurally_complete() {
        let classifier = MockClassifier::seeded(7);
        for _ in 0..200 {
            let result = classifier.classify(Path::new("/nonexistent.png")).unwrap();

            assert!((0.0..=1.0).contains(&result.confidence));
            assert!(result.processing_time > 0.0);
            assert_eq!(result.model_version, MOCK_MODEL_VERSION);
            assert!(IMAGE_QUALITIES.contains(&result.image_quality.as_str()));

            match result.prediction {
                Prediction::Normal => assert!(result.regions.is_empty()),
                Prediction::Suspicious => {
                    assert!((1..=3).contains(&result.regions.len()));
                    for region in &result.regions {
                        assert!((0.0..=1.0).contains(&region.confidence));
                        assert!(LESION_TYPES.contains(&region.kind.as_str()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_seeded_classifiers_agree() {
        let a = MockClassifier::seeded(42);
        let b = MockClassifier::seeded(42);
        let path = Path::new("scan.png");

        for _ in 0..10 {
            assert_eq!(a.classify(path).unwrap(), b.classify(path).unwrap());
        }
    }

    #[test]
    fn test_both_outcomes_occur() {
        let classifier = MockClassifier::seeded(1);
        let outcomes: Vec<Prediction> = (0..200)
            .map(|_| classifier.classify(Path::new("x.png")).unwrap().prediction)
            .collect();

        assert!(outcomes.contains(&Prediction::Normal));
        assert!(outcomes.contains(&Prediction::Suspicious));
    }

    #[test]
    fn test_model_info() {
        let info = MockClassifier::new().model_info().unwrap();
        assert_eq!(info.model_version, MOCK_MODEL_VERSION);
        assert_eq!(info.lesion_types.len(), LESION_TYPES.len());
        assert!(info.supported_formats.contains(&"dicom".to_string()));
    }
}
