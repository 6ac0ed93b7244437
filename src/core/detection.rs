//! The detection loop.
//!
//! Each tick pulls one frame, runs the landmark model on it and, if a face is
//! found, publishes a fresh `StressReading` together with the face mesh. A
//! tick without a face, or with a face that cannot be scored, publishes
//! nothing, so the previous reading stays current.
//!
//! Ticks are strictly sequential: the next one is not awaited until the
//! inference of the current one has resolved, so at most one inference is in
//! flight. The loop runs as a tokio task controlled by a `DetectionHandle`.

use crate::core::normalize::NormalizedFeatures;
use crate::core::scoring::{assess, StressReading};
use crate::error::TickError;
use crate::stats::SharedSessionStats;
use crate::vision::{FrameStream, LandmarkModel, LandmarkSet, Point};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// What the presentation layer sees after a successful tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publication {
    pub reading: StressReading,
    pub features: NormalizedFeatures,
    /// Full landmark mesh of the scored face, for the overlay
    pub mesh: Vec<Point>,
    pub frame_index: u64,
    pub observed_at: DateTime<Utc>,
}

/// How a tick ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The camera had no frame to give
    FrameUnavailable,
    /// The model found no face
    NoFace,
    /// A new reading was published
    Published(StressReading),
}

/// Shortest accepted tick period. Shorter values, including zero, are raised to it.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Runs inference and scoring on a schedule.
pub struct DetectionLoop<M> {
    model: Arc<M>,
    tick_interval: Duration,
    publisher: watch::Sender<Option<Publication>>,
    stats: SharedSessionStats,
}

impl<M: LandmarkModel> DetectionLoop<M> {
    pub fn new(
        model: Arc<M>,
        tick_interval: Duration,
        publisher: watch::Sender<Option<Publication>>,
        stats: SharedSessionStats,
    ) -> Self {
        Self {
            model,
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
            publisher,
            stats,
        }
    }

    /// Subscribe to publications.
    pub fn subscribe(&self) -> watch::Receiver<Option<Publication>> {
        self.publisher.subscribe()
    }

    /// Run a single tick against `stream`.
    ///
    /// Errors are per-tick: the published reading is untouched and the caller
    /// may tick again.
    pub async fn tick<S: FrameStream>(&self, stream: &mut S) -> Result<TickOutcome, TickError> {
        self.stats.record_tick();

        let Some(frame) = stream.next_frame() else {
            self.stats.record_frame_unavailable();
            return Ok(TickOutcome::FrameUnavailable);
        };

        let faces = match self.model.detect(&frame).await {
            Ok(faces) => faces,
            Err(e) => {
                self.stats.record_detect_error();
                return Err(e.into());
            }
        };

        // Only the first face is scored.
        let Some(face) = faces.into_iter().next() else {
            self.stats.record_no_face();
            return Ok(TickOutcome::NoFace);
        };

        let scored = LandmarkSet::try_from(face).and_then(|landmarks| {
            let (features, reading) = assess(&landmarks)?;
            Ok((features, reading, landmarks.into_mesh()))
        });
        let (features, reading, mesh) = match scored {
            Ok(scored) => scored,
            Err(e) => {
                self.stats.record_malformed();
                return Err(e.into());
            }
        };

        self.publisher.send_replace(Some(Publication {
            reading,
            features,
            mesh,
            frame_index: frame.index,
            observed_at: frame.captured_at,
        }));
        self.stats.record_published();
        tracing::trace!(
            frame = frame.index,
            score = reading.score,
            eye = features.eye_openness,
            mouth = features.mouth_tension,
            brow = features.brow_furrow,
            "reading published"
        );
        Ok(TickOutcome::Published(reading))
    }

    /// Spawn the loop on the current tokio runtime.
    ///
    /// The stream is owned by the task and handed back by
    /// `DetectionHandle::stop` once the task has finished.
    pub fn start<S: FrameStream>(self, stream: S) -> DetectionHandle<S> {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stream, stop_rx));
        DetectionHandle {
            stop_tx,
            task: Some(task),
        }
    }

    async fn run<S: FrameStream>(self, mut stream: S, mut stop_rx: watch::Receiver<bool>) -> S {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = self.tick_interval.as_millis() as u64, "detection loop started");

        loop {
            tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => {}
            }

            // Stopping mid-inference drops the pending inference; its result is never published.
            let result = tokio::select! {
                biased;
                _ = stop_rx.changed() => break,
                result = self.tick(&mut stream) => result,
            };

            if let Err(e) = result {
                tracing::debug!("tick skipped: {e}");
            }
        }

        tracing::info!("detection loop stopped");
        stream
    }
}

/// Start/stop handle for a running `DetectionLoop`.
///
/// Dropping the handle also stops the loop, but the stream is then dropped
/// with the task instead of being returned. Owners that must release the
/// stream call `stop` first.
pub struct DetectionHandle<S> {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<S>>,
}

impl<S: FrameStream> DetectionHandle<S> {
    /// Stop the loop and wait for it to finish.
    ///
    /// Returns the stream on the first call and `None` afterwards. When this
    /// returns, no further tick will run.
    pub async fn stop(&mut self) -> Option<S> {
        let task = self.task.take()?;
        self.stop_tx.send_replace(true);

        match task.await {
            Ok(stream) => Some(stream),
            Err(e) => {
                tracing::error!("detection task ended abnormally: {e}");
                None
            }
        }
    }

    /// Whether the loop task is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DetectError, MalformedLandmarks};
    use crate::stats::create_shared_stats;
    use crate::vision::{FaceDetection, FaceRegion, Frame};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct QueueModel(Mutex<VecDeque<Result<Vec<FaceDetection>, DetectError>>>);

    impl LandmarkModel for QueueModel {
        async fn detect(&self, _frame: &Frame) -> Result<Vec<FaceDetection>, DetectError> {
            self.0.lock().unwrap().pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    struct Frames(u64);

    impl FrameStream for Frames {
        fn next_frame(&mut self) -> Option<Frame> {
            self.0 += 1;
            Some(Frame {
                index: self.0,
                width: 1,
                height: 1,
                captured_at: Utc::now(),
                pixels: Arc::from(vec![0u8; 3]),
            })
        }
    }

    fn face(brow_diff: f64) -> FaceDetection {
        let contour = |y: f64| (0..8).map(|i| Point::new(i as f64, y)).collect::<Vec<_>>();
        FaceDetection::default()
            .with_region(FaceRegion::LeftEyeUpper, contour(0.0))
            .with_region(FaceRegion::RightEyeUpper, contour(0.0))
            .with_region(FaceRegion::LipsUpperOuter, contour(0.0))
            .with_region(FaceRegion::LipsLowerOuter, contour(0.0))
            .with_region(FaceRegion::LeftEyebrowUpper, contour(brow_diff))
            .with_region(FaceRegion::RightEyebrowUpper, contour(0.0))
            .with_mesh(vec![Point::new(1.0, 1.0)])
    }

    fn detection_loop(
        results: Vec<Result<Vec<FaceDetection>, DetectError>>,
    ) -> DetectionLoop<QueueModel> {
        let (tx, _rx) = watch::channel(None);
        DetectionLoop::new(
            Arc::new(QueueModel(Mutex::new(results.into()))),
            Duration::from_millis(10),
            tx,
            create_shared_stats(),
        )
    }

    #[tokio::test]
    async fn test_tick_publishes_first_face_only() {
        let lp = detection_loop(vec![Ok(vec![face(10.0), face(0.0)])]);
        let rx = lp.subscribe();

        let outcome = lp.tick(&mut Frames(0)).await.unwrap();
        let published = rx.borrow().clone().unwrap();

        // brow diff 10 -> normalized 1.0 -> score 0.4
        assert!((published.reading.score - 0.4).abs() < 1e-9);
        assert_eq!(outcome, TickOutcome::Published(published.reading));
        assert_eq!(published.mesh, vec![Point::new(1.0, 1.0)]);
        assert_eq!(published.frame_index, 1);
    }

    #[tokio::test]
    async fn test_tick_errors_keep_previous_reading() {
        let mut missing = face(0.0);
        missing.annotations.remove("lipsLowerOuter");

        let lp = detection_loop(vec![
            Ok(vec![face(5.0)]),
            Ok(vec![missing]),
            Err(DetectError("gpu lost".to_string())),
            Ok(vec![]),
        ]);
        let rx = lp.subscribe();
        let mut frames = Frames(0);

        lp.tick(&mut frames).await.unwrap();
        let before = rx.borrow().clone();

        let err = lp.tick(&mut frames).await.unwrap_err();
        assert_eq!(
            err,
            TickError::Malformed(MalformedLandmarks::MissingRegion(FaceRegion::LipsLowerOuter))
        );
        assert!(matches!(lp.tick(&mut frames).await, Err(TickError::Detect(_))));
        assert_eq!(lp.tick(&mut frames).await.unwrap(), TickOutcome::NoFace);

        assert_eq!(*rx.borrow(), before);
        let s = lp.stats.snapshot();
        assert_eq!(s.ticks, 4);
        assert_eq!(s.readings_published, 1);
        assert_eq!(s.malformed_ticks, 1);
        assert_eq!(s.detect_errors, 1);
        assert_eq!(s.no_face_ticks, 1);
    }
}
