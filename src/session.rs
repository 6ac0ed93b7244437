//! Session lifecycle: readiness, detection and teardown.
//!
//! A `Session` owns the camera for its whole life. `initialize` loads the
//! model and acquires the camera concurrently, feeding each outcome to the
//! `ReadinessController` as it arrives. Detection starts only once both have
//! succeeded. `shutdown` stops the detection loop first and only then releases
//! the camera stream, so an in-flight inference never races the release.

use crate::config::Config;
use crate::core::{DetectionHandle, DetectionLoop, Publication, ReadinessController, ReadinessState};
use crate::stats::SharedSessionStats;
use crate::vision::{Camera, ModelLoader};
use std::sync::Arc;
use tokio::sync::watch;

/// One run of the agent from startup to teardown.
///
/// Call `shutdown` before dropping a running session. Dropping it still
/// stops the detection loop, but the stream is then dropped with the loop
/// task and `Camera::release` is never called.
pub struct Session<C: Camera> {
    camera: C,
    config: Config,
    readiness: ReadinessController,
    readiness_tx: watch::Sender<ReadinessState>,
    /// Moved into the detection loop when it starts
    publisher: Option<watch::Sender<Option<Publication>>>,
    publications: watch::Receiver<Option<Publication>>,
    detection: Option<DetectionHandle<C::Stream>>,
    stats: SharedSessionStats,
}

impl<C: Camera> Session<C> {
    pub fn new(camera: C, config: Config, stats: SharedSessionStats) -> Self {
        let (readiness_tx, _) = watch::channel(ReadinessState::Initializing);
        let (publisher, publications) = watch::channel(None);
        Self {
            camera,
            config,
            readiness: ReadinessController::new(),
            readiness_tx,
            publisher: Some(publisher),
            publications,
            detection: None,
            stats,
        }
    }

    /// Current readiness state.
    pub fn state(&self) -> ReadinessState {
        self.readiness.state()
    }

    /// Human-readable status, including the failure reason if any.
    pub fn status_message(&self) -> String {
        self.readiness.status_message()
    }

    /// Observe readiness changes.
    pub fn readiness(&self) -> watch::Receiver<ReadinessState> {
        self.readiness_tx.subscribe()
    }

    /// Observe published readings. Holds `None` until the first face is scored.
    pub fn publications(&self) -> watch::Receiver<Option<Publication>> {
        self.publications.clone()
    }

    pub fn stats(&self) -> &SharedSessionStats {
        &self.stats
    }

    /// Whether the detection loop is running.
    pub fn is_detecting(&self) -> bool {
        self.detection.as_ref().is_some_and(|h| h.is_running())
    }

    /// Load the model and acquire the camera, then start detection if both succeeded.
    ///
    /// Returns the resulting state. Only the first call does anything; later
    /// calls return the state reached by the first.
    pub async fn initialize<L: ModelLoader>(&mut self, loader: &L) -> ReadinessState {
        let Some(publisher) = self.publisher.take() else {
            return self.readiness.state();
        };
        tracing::info!("{}", self.readiness.status_message());

        let load = loader.load(&self.config.model);
        let acquire = self.camera.acquire(&self.config.camera);
        tokio::pin!(load, acquire);

        let mut model = None;
        let mut stream = None;
        let (mut load_done, mut acquire_done) = (false, false);

        while !(load_done && acquire_done) {
            tokio::select! {
                result = &mut load, if !load_done => {
                    load_done = true;
                    match result {
                        Ok(m) => {
                            self.readiness.model_loaded();
                            model = Some(m);
                        }
                        Err(e) => {
                            self.readiness.model_failed(&e);
                        }
                    }
                }
                result = &mut acquire, if !acquire_done => {
                    acquire_done = true;
                    match result {
                        Ok(s) => {
                            self.readiness.camera_acquired();
                            stream = Some(s);
                        }
                        Err(e) => {
                            self.readiness.camera_failed(&e);
                        }
                    }
                }
            }
            self.readiness_tx.send_replace(self.readiness.state());
        }

        match (self.readiness.state(), model, stream) {
            (ReadinessState::Ready, Some(model), Some(stream)) => {
                let detection = DetectionLoop::new(
                    Arc::new(model),
                    self.config.tick_interval,
                    publisher,
                    Arc::clone(&self.stats),
                );
                self.detection = Some(detection.start(stream));
            }
            (state, _, Some(stream)) => {
                // Camera came up but detection cannot run.
                tracing::warn!(?state, "releasing camera without starting detection");
                self.camera.release(stream);
            }
            (state, _, None) => {
                tracing::warn!(?state, "{}", self.readiness.status_message());
            }
        }

        self.readiness.state()
    }

    /// Stop detection and release the camera. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        let Some(mut handle) = self.detection.take() else {
            return;
        };
        if let Some(stream) = handle.stop().await {
            self.camera.release(stream);
            tracing::info!("camera released");
        }
    }
}

impl<C: Camera> Drop for Session<C> {
    fn drop(&mut self) {
        if self.detection.is_some() {
            tracing::warn!("session dropped without shutdown; camera stream not released");
        }
    }
}
