//! Stress scoring from normalized features.

use crate::core::features::extract_features;
use crate::core::normalize::{normalize, NormalizedFeatures};
use crate::error::MalformedLandmarks;
use crate::vision::LandmarkSet;
use serde::{Deserialize, Serialize};
use std::fmt;

const EYE_WEIGHT: f64 = 0.3;
const MOUTH_WEIGHT: f64 = 0.3;
const BROW_WEIGHT: f64 = 0.4;

/// Scores below this are `Low`.
pub const MODERATE_THRESHOLD: f64 = 0.3;
/// Scores at or above this are `High`.
pub const HIGH_THRESHOLD: f64 = 0.6;

/// Discrete stress band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLabel {
    Low,
    Moderate,
    High,
}

impl StressLabel {
    /// Band for a score. Lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            StressLabel::High
        } else if score >= MODERATE_THRESHOLD {
            StressLabel::Moderate
        } else {
            StressLabel::Low
        }
    }
}

impl fmt::Display for StressLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressLabel::Low => f.write_str("Low Stress"),
            StressLabel::Moderate => f.write_str("Moderate Stress"),
            StressLabel::High => f.write_str("High Stress"),
        }
    }
}

/// The published stress estimate for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressReading {
    /// Weighted score in [0, 1]
    pub score: f64,
    pub label: StressLabel,
}

impl StressReading {
    fn from_score(score: f64) -> Self {
        Self {
            score,
            label: StressLabel::from_score(score),
        }
    }
}

/// Combine normalized features into a reading.
pub fn score(features: &NormalizedFeatures) -> StressReading {
    let score = EYE_WEIGHT * features.eye_openness
        + MOUTH_WEIGHT * features.mouth_tension
        + BROW_WEIGHT * features.brow_furrow;
    // Weights sum to 1; the clamp only absorbs float rounding at the edges.
    StressReading::from_score(score.clamp(0.0, 1.0))
}

/// Run the whole pipeline for one face: extract, normalize, score.
pub fn assess(
    landmarks: &LandmarkSet,
) -> Result<(NormalizedFeatures, StressReading), MalformedLandmarks> {
    let raw = extract_features(landmarks)?;
    let normalized = normalize(&raw);
    Ok((normalized, score(&normalized)))
}
