//! Readiness state machine gating the detection loop.
//!
//! ```text
//!                  model ok + camera ok (any order)
//!   Initializing ────────────────────────────────────▶ Ready
//!        │   │
//!        │   └── camera failed ──▶ CameraFailed   (terminal)
//!        └────── model failed ───▶ ModelFailed    (terminal)
//! ```
//!
//! Failure states and `Ready` ignore any further signal. Teardown of a running
//! session happens outside this machine.

use crate::error::{AcquireError, LoadError};
use serde::{Deserialize, Serialize};

/// Whether detection may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    Initializing,
    ModelFailed,
    CameraFailed,
    Ready,
}

impl ReadinessState {
    /// Whether no further transition can happen.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ReadinessState::Initializing)
    }
}

/// Drives `ReadinessState` from model-load and camera-acquire outcomes.
#[derive(Debug)]
pub struct ReadinessController {
    state: ReadinessState,
    model_loaded: bool,
    camera_acquired: bool,
    /// Reason for a failed state, for display
    failure: Option<String>,
}

impl ReadinessController {
    pub fn new() -> Self {
        Self {
            state: ReadinessState::Initializing,
            model_loaded: false,
            camera_acquired: false,
            failure: None,
        }
    }

    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ReadinessState::Ready
    }

    /// The model finished loading.
    pub fn model_loaded(&mut self) -> ReadinessState {
        if self.state == ReadinessState::Initializing {
            self.model_loaded = true;
            self.promote();
        }
        self.state
    }

    /// The model could not be loaded.
    pub fn model_failed(&mut self, error: &LoadError) -> ReadinessState {
        self.fail(ReadinessState::ModelFailed, error.to_string())
    }

    /// The camera stream was acquired.
    pub fn camera_acquired(&mut self) -> ReadinessState {
        if self.state == ReadinessState::Initializing {
            self.camera_acquired = true;
            self.promote();
        }
        self.state
    }

    /// The camera could not be acquired.
    pub fn camera_failed(&mut self, error: &AcquireError) -> ReadinessState {
        self.fail(ReadinessState::CameraFailed, error.to_string())
    }

    /// Human-readable status for the current state.
    pub fn status_message(&self) -> String {
        let reason = self.failure.as_deref().unwrap_or("unknown error");
        match self.state {
            ReadinessState::Initializing => {
                match (self.model_loaded, self.camera_acquired) {
                    (false, false) => "Loading model and starting camera...".to_string(),
                    (true, false) => "Model loaded, waiting for camera...".to_string(),
                    (false, true) => "Camera ready, loading model...".to_string(),
                    (true, true) => "Starting detection...".to_string(),
                }
            }
            ReadinessState::ModelFailed => format!("Failed to load face model: {reason}"),
            ReadinessState::CameraFailed => format!("Camera access error: {reason}"),
            ReadinessState::Ready => "Detecting".to_string(),
        }
    }

    fn promote(&mut self) {
        if self.model_loaded && self.camera_acquired {
            self.state = ReadinessState::Ready;
            tracing::info!("readiness: ready");
        }
    }

    fn fail(&mut self, target: ReadinessState, reason: String) -> ReadinessState {
        if self.state == ReadinessState::Initializing {
            tracing::warn!(state = ?target, %reason, "readiness: failed");
            self.state = target;
            self.failure = Some(reason);
        }
        self.state
    }
}

impl Default for ReadinessController {
    fn default() -> Self {
        Self::new()
    }
}
