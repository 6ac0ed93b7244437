//! Core functionality for the facial stress agent.
//!
//! This module contains:
//! - Feature extraction from facial landmarks
//! - Normalization and stress scoring
//! - The readiness state machine and the detection loop
//! - HSI snapshot rendering for export

pub mod detection;
pub mod features;
pub mod hsi;
pub mod normalize;
pub mod readiness;
pub mod scoring;

// Re-export commonly used types
pub use detection::{
    DetectionHandle, DetectionLoop, Publication, TickOutcome, MIN_TICK_INTERVAL,
};
pub use features::{extract_features, RawFeatures};
pub use hsi::{HsiBuilder, HsiSnapshot, HSI_VERSION, PRODUCER_NAME};
pub use normalize::{normalize, NormalizedFeatures};
pub use readiness::{ReadinessController, ReadinessState};
pub use scoring::{assess, score, StressLabel, StressReading};
