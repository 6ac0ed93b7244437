//! Vision collaborators: the landmark model and the camera.
//!
//! Both are external to the estimation pipeline. This module defines the
//! traits the pipeline depends on, the boundary types they exchange, and two
//! reference implementations used by the CLI: a replay model that plays back
//! recorded detections and a synthetic camera that produces blank frames.

pub mod replay;
pub mod synthetic;
pub mod types;

use crate::config::{CameraConstraints, ModelConfig};
use crate::error::{AcquireError, DetectError, LoadError};
use std::future::Future;

pub use replay::{ReplayModel, ReplayModelLoader};
pub use synthetic::{SyntheticCamera, SyntheticStream};
pub use types::{FaceDetection, FaceRegion, Frame, LandmarkSet, Point};

/// A loaded facial landmark model.
pub trait LandmarkModel: Send + Sync + 'static {
    /// Run inference on one frame. An empty result means no face was found.
    fn detect(
        &self,
        frame: &Frame,
    ) -> impl Future<Output = Result<Vec<FaceDetection>, DetectError>> + Send;
}

/// Produces a `LandmarkModel`, typically by reading weights from disk.
pub trait ModelLoader: Send + Sync {
    type Model: LandmarkModel;

    fn load(
        &self,
        config: &ModelConfig,
    ) -> impl Future<Output = Result<Self::Model, LoadError>> + Send;
}

/// A live source of frames from an acquired camera.
pub trait FrameStream: Send + 'static {
    /// The most recent frame, or `None` while the device has nothing to give.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Acquires and releases camera streams.
pub trait Camera: Send + Sync {
    type Stream: FrameStream;

    fn acquire(
        &self,
        constraints: &CameraConstraints,
    ) -> impl Future<Output = Result<Self::Stream, AcquireError>> + Send;

    /// Stop the device. Takes the stream by value so it can only happen once.
    fn release(&self, stream: Self::Stream);
}
