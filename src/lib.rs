//! Facial Stress Agent - heuristic stress estimation from facial landmarks.
//!
//! This library turns a stream of per-frame facial landmark detections into a
//! normalized, labeled stress score, and controls when detection may run.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       Facial Stress Agent                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   permits   ┌───────────────┐                    │
//! │  │ Readiness  │────────────▶│ DetectionLoop │◀── camera frames   │
//! │  │ Controller │             │  (per tick)   │◀── landmark model  │
//! │  └────────────┘             └───────┬───────┘                    │
//! │                                     ▼                            │
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐                │
//! │  │  Features  │──▶│ Normalizer │──▶│   Scorer   │──▶ Publication │
//! │  └────────────┘   └────────────┘   └────────────┘                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use facial_stress_agent::{stats, Config, ReplayModelLoader, Session, SyntheticCamera};
//!
//! # async fn run() {
//! let config = Config::default();
//! let mut session = Session::new(SyntheticCamera::new(), config, stats::create_shared_stats());
//!
//! session.initialize(&ReplayModelLoader::new("faces.jsonl")).await;
//! let mut readings = session.publications();
//! while readings.changed().await.is_ok() {
//!     if let Some(p) = readings.borrow().as_ref() {
//!         println!("{:.2} {}", p.reading.score, p.reading.label);
//!     }
//! }
//! session.shutdown().await;
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod stats;
pub mod vision;

// Re-export key types at crate root for convenience
pub use config::{CameraConstraints, Config, ModelConfig};
pub use self::core::{
    assess, extract_features, normalize, score, DetectionHandle, DetectionLoop, HsiBuilder,
    HsiSnapshot, NormalizedFeatures, Publication, RawFeatures, ReadinessController,
    ReadinessState, StressLabel, StressReading, TickOutcome,
};
pub use error::{AcquireError, ConfigError, DetectError, LoadError, MalformedLandmarks, TickError};
pub use session::Session;
pub use stats::{SessionStats, SharedSessionStats};
pub use vision::{
    Camera, FaceDetection, FaceRegion, Frame, FrameStream, LandmarkModel, LandmarkSet,
    ModelLoader, Point, ReplayModel, ReplayModelLoader, SyntheticCamera, SyntheticStream,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Disclaimer shown to users before any reading.
pub const DISCLAIMER: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║             FACIAL STRESS AGENT - READ BEFORE USE                ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  The stress level shown is a rough heuristic computed from       ║
║  three facial measurements:                                      ║
║    • How open the eyes are                                       ║
║    • The gap between the lips                                    ║
║    • The height difference between the eyebrows                  ║
║                                                                  ║
║  ✗ THIS IS NOT A MEDICAL OR CLINICAL MEASUREMENT.                ║
║    Do not use it to diagnose or monitor any condition.           ║
║                                                                  ║
║  Only the first face in view is analysed. Frames are processed   ║
║  in memory and discarded; no images or readings are stored.      ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;
