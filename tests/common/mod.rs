//! Shared collaborators for integration tests.

#![allow(dead_code)]

use facial_stress_agent::{
    config::{CameraConstraints, ModelConfig},
    AcquireError, Camera, DetectError, FaceDetection, FaceRegion, Frame, LandmarkModel, LoadError,
    ModelLoader, Point, SyntheticCamera, SyntheticStream,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Script = Vec<Result<Vec<FaceDetection>, DetectError>>;

/// A face whose raw features are exactly the given measurements.
///
/// Eye aperture is the same for both eyes, the lip gap is taken at the
/// midpoint and the left brow sits `brow_diff` above the right one.
pub fn face(eye: f64, mouth_gap: f64, brow_diff: f64) -> FaceDetection {
    let eye_contour = (0..8)
        .map(|i| match i {
            3 => Point::new(i as f64, 100.0),
            7 => Point::new(i as f64, 100.0 + eye),
            _ => Point::new(i as f64, 95.0),
        })
        .collect::<Vec<_>>();
    let lip = |y: f64| (0..11).map(|i| Point::new(i as f64, y)).collect::<Vec<_>>();
    let brow = |y: f64| (0..5).map(|i| Point::new(i as f64, y)).collect::<Vec<_>>();

    FaceDetection::default()
        .with_region(FaceRegion::LeftEyeUpper, eye_contour.clone())
        .with_region(FaceRegion::RightEyeUpper, eye_contour)
        .with_region(FaceRegion::LipsUpperOuter, lip(200.0))
        .with_region(FaceRegion::LipsLowerOuter, lip(200.0 + mouth_gap))
        .with_region(FaceRegion::LeftEyebrowUpper, brow(60.0))
        .with_region(FaceRegion::RightEyebrowUpper, brow(60.0 + brow_diff))
        .with_mesh(vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)])
}

/// A face without its lower lip contour.
pub fn malformed_face() -> FaceDetection {
    let mut f = face(15.0, 10.0, 5.0);
    f.annotations.remove(FaceRegion::LipsLowerOuter.annotation_key());
    f
}

/// Model that plays a fixed script, then reports no face forever.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<Vec<FaceDetection>, DetectError>>>,
    latency: Duration,
    calls: Arc<AtomicUsize>,
}

impl LandmarkModel for ScriptedModel {
    async fn detect(&self, _frame: &Frame) -> Result<Vec<FaceDetection>, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or(Ok(Vec::new()))
    }
}

/// Loader for `ScriptedModel`, with an optional delay and failure.
pub struct ScriptedLoader {
    script: Mutex<Option<Script>>,
    failure: Option<LoadError>,
    delay: Duration,
    latency: Duration,
    loads: AtomicUsize,
    detect_calls: Arc<AtomicUsize>,
}

impl ScriptedLoader {
    pub fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(Some(script)),
            failure: None,
            delay: Duration::ZERO,
            latency: Duration::ZERO,
            loads: AtomicUsize::new(0),
            detect_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: LoadError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(Vec::new())
        }
    }

    /// Resolve `load` only after `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make every inference take `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Inference calls made by the loaded model so far.
    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }
}

impl ModelLoader for ScriptedLoader {
    type Model = ScriptedModel;

    async fn load(&self, _config: &ModelConfig) -> Result<ScriptedModel, LoadError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(ref err) = self.failure {
            return Err(err.clone());
        }
        let script = self.script.lock().unwrap().take().unwrap_or_default();
        Ok(ScriptedModel {
            script: Mutex::new(script.into()),
            latency: self.latency,
            calls: Arc::clone(&self.detect_calls),
        })
    }
}

/// A `SyntheticCamera` that takes a while to come up.
#[derive(Clone)]
pub struct SlowCamera {
    pub inner: SyntheticCamera,
    pub delay: Duration,
}

impl Camera for SlowCamera {
    type Stream = SyntheticStream;

    async fn acquire(&self, constraints: &CameraConstraints) -> Result<SyntheticStream, AcquireError> {
        tokio::time::sleep(self.delay).await;
        self.inner.acquire(constraints).await
    }

    fn release(&self, stream: SyntheticStream) {
        self.inner.release(stream);
    }
}
