//! Replay model: plays back recorded landmark detections.
//!
//! The recording is a JSON Lines file. Each line is the model output for one
//! frame, an array of face detections; an empty array records a frame where
//! no face was found. Playback loops over the recording.

use crate::config::ModelConfig;
use crate::error::{DetectError, LoadError};
use crate::vision::types::{FaceDetection, Frame};
use crate::vision::{LandmarkModel, ModelLoader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Loads a `ReplayModel` from a JSON Lines recording.
#[derive(Debug, Clone)]
pub struct ReplayModelLoader {
    path: PathBuf,
}

impl ReplayModelLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelLoader for ReplayModelLoader {
    type Model = ReplayModel;

    async fn load(&self, config: &ModelConfig) -> Result<ReplayModel, LoadError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoadError::Unavailable(format!("{}: {e}", self.path.display())))?;

        let model = ReplayModel::from_jsonl(&content, config.max_faces)?;
        tracing::info!(
            path = %self.path.display(),
            frames = model.len(),
            "replay model loaded"
        );
        Ok(model)
    }
}

/// A landmark model that returns recorded detections in order.
#[derive(Debug)]
pub struct ReplayModel {
    frames: Vec<Vec<FaceDetection>>,
    cursor: AtomicUsize,
}

impl ReplayModel {
    /// Build a model from in-memory frames.
    pub fn new(frames: Vec<Vec<FaceDetection>>) -> Result<Self, LoadError> {
        if frames.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self {
            frames,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Parse a JSON Lines recording, keeping at most `max_faces` per frame.
    ///
    /// At least one face is always kept; a `max_faces` of 0 is treated as 1.
    pub fn from_jsonl(content: &str, max_faces: usize) -> Result<Self, LoadError> {
        if max_faces == 0 {
            tracing::warn!("max_faces is 0, keeping the first face of each frame");
        }
        let max_faces = max_faces.max(1);
        let mut frames = Vec::new();

        for (i, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut faces: Vec<FaceDetection> =
                serde_json::from_str(line).map_err(|e| LoadError::InvalidData {
                    line: i + 1,
                    message: e.to_string(),
                })?;
            faces.truncate(max_faces);
            frames.push(faces);
        }

        Self::new(frames)
    }

    /// Number of recorded frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkModel for ReplayModel {
    async fn detect(&self, _frame: &Frame) -> Result<Vec<FaceDetection>, DetectError> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        Ok(self.frames[i].clone())
    }
}
