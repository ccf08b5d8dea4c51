//! Confidence tier classification
//!
//! Buckets a continuous AcoustID match score into high/medium/low.
//! Thresholds are fixed and always applied to the raw (unrounded) score.

use serde::{Deserialize, Serialize};

/// Lower bound (inclusive) of the high tier
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Lower bound (inclusive) of the medium tier
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Confidence tier of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

/// Classify a raw match score
///
/// Total over all floats: anything that is not `>= 0.5` (including NaN) is low.
pub fn classify(score: f64) -> ConfidenceTier {
    if score >= HIGH_CONFIDENCE {
        ConfidenceTier::High
    } else if score >= MEDIUM_CONFIDENCE {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}
