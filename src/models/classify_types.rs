use crate::models::fruit_types::{FruitClass, FruitProfile};
use serde::Serialize;
use std::collections::BTreeMap;

pub const LOW_CONFIDENCE_THRESHOLD: f64 = 70.0;
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 85.0;

const LOW_CONFIDENCE_WARNING: &str =
    "Low confidence. Try taking the photo again with better lighting and a clearer view of the fruit!";
const MEDIUM_CONFIDENCE_WARNING: &str =
    "Medium confidence. For a more accurate result, make sure the lighting is good and the fruit is not blocked.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// `confidence` is a percentage in `[0, 100]`.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence < LOW_CONFIDENCE_THRESHOLD {
            ConfidenceLevel::Low
        } else if confidence < MEDIUM_CONFIDENCE_THRESHOLD {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        }
    }

    pub fn warning(&self) -> Option<&'static str> {
        match self {
            ConfidenceLevel::Low => Some(LOW_CONFIDENCE_WARNING),
            ConfidenceLevel::Medium => Some(MEDIUM_CONFIDENCE_WARNING),
            ConfidenceLevel::High => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub class: FruitClass,
    pub probability: f32,
}

/// Response body of a successful `/predict` call.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub success: bool,
    pub predicted_class: FruitClass,
    pub confidence: f64,
    pub all_probabilities: BTreeMap<String, f64>,
    pub fruit_info: FruitProfile,
    pub inference_time_ms: f64,
    pub warning: Option<String>,
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_boundaries() {
        assert_eq!(ConfidenceLevel::from_confidence(69.99), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(70.0), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(84.99), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(85.0), ConfidenceLevel::High);
        assert!(ConfidenceLevel::High.warning().is_none());
        assert!(ConfidenceLevel::Low.warning().unwrap().starts_with("Low confidence"));
        assert!(ConfidenceLevel::Medium.warning().unwrap().starts_with("Medium confidence"));
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(69.994), 69.99);
        assert_eq!(round2(12.345678), 12.35);
        assert_eq!(round2(100.0), 100.0);
    }
}
