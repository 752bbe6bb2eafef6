//! Classifier output types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Overall outcome of an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prediction {
    Normal,
    Suspicious,
}

impl Prediction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Normal => "normal",
            Prediction::Suspicious => "suspicious",
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prediction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Prediction::Normal),
            "suspicious" => Ok(Prediction::Suspicious),
            other => Err(format!("unknown prediction '{}'", other)),
        }
    }
}

/// Region of interest within an image, in pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Lesion type (e.g. "mass", "calcification")
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Complete result of one classifier run
///
/// Always structurally complete: a normal result carries an empty region list,
/// never a missing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub prediction: Prediction,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Seconds spent producing the result
    pub processing_time: f64,
    pub regions: Vec<Region>,
    pub model_version: String,
    pub image_quality: String,
}

/// Classifier metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_version: String,
    pub model_type: String,
    pub supported_formats: Vec<String>,
    pub lesion_types: Vec<String>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_parse_and_display() {
        assert_eq!("normal".parse::<Prediction>(), Ok(Prediction::Normal));
        assert_eq!("suspicious".parse::<Prediction>(), Ok(Prediction::Suspicious));
        assert!("benign".parse::<Prediction>().is_err());
        assert_eq!(Prediction::Suspicious.to_string(), "suspicious");
    }

    #[test]
    fn test_region_serializes_kind_as_type() {
        let region = Region {
            id: "region_1".to_string(),
            x: 10,
            y: 20,
            width: 30,
            height: 40,
            confidence: 0.5,
            kind: "mass".to_string(),
            severity: None,
            description: None,
        };

        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["type"], "mass");
        assert!(json.get("kind").is_none());
        assert!(json.get("severity").is_none());
    }
}
