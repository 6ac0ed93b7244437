//! Synthetic camera that produces blank frames.
//!
//! Stands in for a real capture device so the agent can run headless, e.g.
//! together with the replay model. Also used in tests to observe how often
//! streams are acquired and released.

use crate::config::CameraConstraints;
use crate::error::AcquireError;
use crate::vision::types::Frame;
use crate::vision::{Camera, FrameStream};
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A camera that never touches hardware.
#[derive(Debug, Clone, Default)]
pub struct SyntheticCamera {
    /// Number of initial `next_frame` calls that yield nothing
    warmup_frames: u64,
    /// Error to return from `acquire`, if any
    failure: Option<AcquireError>,
    releases: Arc<AtomicUsize>,
}

impl SyntheticCamera {
    /// Create a camera that succeeds immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera whose `acquire` always fails.
    pub fn failing(error: AcquireError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Skip the first `frames` frames, like a device still warming up.
    pub fn with_warmup(mut self, frames: u64) -> Self {
        self.warmup_frames = frames;
        self
    }

    /// How many streams have been released so far.
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl Camera for SyntheticCamera {
    type Stream = SyntheticStream;

    async fn acquire(&self, constraints: &CameraConstraints) -> Result<SyntheticStream, AcquireError> {
        if let Some(ref err) = self.failure {
            return Err(err.clone());
        }
        if constraints.width == 0 || constraints.height == 0 {
            return Err(AcquireError::Unsupported {
                width: constraints.width,
                height: constraints.height,
            });
        }

        tracing::debug!(
            width = constraints.width,
            height = constraints.height,
            "synthetic camera acquired"
        );

        let len = constraints.width as usize * constraints.height as usize * 3;
        Ok(SyntheticStream {
            width: constraints.width,
            height: constraints.height,
            next_index: 0,
            warmup_remaining: self.warmup_frames,
            blank: Arc::from(vec![0u8; len]),
        })
    }

    fn release(&self, stream: SyntheticStream) {
        self.releases.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(frames = stream.next_index, "synthetic camera released");
    }
}

/// Frame stream handed out by `SyntheticCamera`.
#[derive(Debug)]
pub struct SyntheticStream {
    width: u32,
    height: u32,
    next_index: u64,
    warmup_remaining: u64,
    blank: Arc<[u8]>,
}

impl SyntheticStream {
    /// Number of frames produced so far.
    pub fn frames_produced(&self) -> u64 {
        self.next_index
    }
}

impl FrameStream for SyntheticStream {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return None;
        }

        let frame = Frame {
            index: self.next_index,
            width: self.width,
            height: self.height,
            captured_at: Utc::now(),
            pixels: Arc::clone(&self.blank),
        };
        self.next_index += 1;
        Some(frame)
    }
}
