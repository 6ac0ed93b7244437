//! Error types for the facial stress agent.
//!
//! Errors fall into two groups. `LoadError` and `AcquireError` are terminal:
//! they move the readiness state machine into a failed state and detection
//! never starts. `MalformedLandmarks` and `DetectError` only affect a single
//! tick; the detection loop logs them and keeps the previous reading.

use crate::vision::FaceRegion;
use thiserror::Error;

/// The landmark model could not be made available.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Model source (file, bundle) could not be read
    #[error("model source unavailable: {0}")]
    Unavailable(String),

    /// Model data was read but could not be decoded
    #[error("invalid model data at line {line}: {message}")]
    InvalidData { line: usize, message: String },

    /// Model contained nothing usable
    #[error("model is empty")]
    Empty,
}

/// The camera stream could not be acquired.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquireError {
    /// The user or the platform refused camera access
    #[error("camera access denied: {0}")]
    PermissionDenied(String),

    /// No device satisfies the requested constraints
    #[error("no camera matches {width}x{height}")]
    Unsupported { width: u32, height: u32 },

    /// Device exists but failed to start
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

/// A detected face is missing data the feature extractor depends on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedLandmarks {
    /// A named contour was absent from the model output
    #[error("landmark region {0} is missing")]
    MissingRegion(FaceRegion),

    /// A contour was present but too short for a referenced point
    #[error("landmark region {region} has {len} points, index {index} required")]
    MissingIndex {
        region: FaceRegion,
        index: usize,
        len: usize,
    },
}

/// A single inference call failed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("landmark inference failed: {0}")]
pub struct DetectError(pub String);

/// Why a tick ended without publishing a reading.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TickError {
    #[error(transparent)]
    Malformed(#[from] MalformedLandmarks),

    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
