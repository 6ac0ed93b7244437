//! Session statistics for the detection loop.
//!
//! Counts what happened on each tick so a user can see how often a face was
//! found and scored. Only counts are kept; no reading or landmark is stored.
//!
//! With persistence enabled, totals from earlier sessions are kept apart
//! from the live counters: `snapshot` and `summary` describe this session,
//! `totals` and `save` cover every session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tick outcome counters for the current session.
#[derive(Debug)]
pub struct SessionStats {
    /// Ticks that ran
    ticks: AtomicU64,
    /// Ticks where the camera had no frame yet
    frames_unavailable: AtomicU64,
    /// Ticks where the model found no face
    no_face_ticks: AtomicU64,
    /// Ticks skipped because the face was missing landmarks
    malformed_ticks: AtomicU64,
    /// Ticks skipped because inference failed
    detect_errors: AtomicU64,
    /// Readings published
    readings_published: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
    /// Totals persisted by earlier sessions
    previous: Option<PersistedStats>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            frames_unavailable: AtomicU64::new(0),
            no_face_ticks: AtomicU64::new(0),
            malformed_ticks: AtomicU64::new(0),
            detect_errors: AtomicU64::new(0),
            readings_published: AtomicU64::new(0),
            session_start: Utc::now(),
            persist_path: None,
            previous: None,
        }
    }

    /// Create stats whose `save` adds onto the totals of earlier sessions.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        if let Err(e) = stats.load() {
            tracing::warn!("could not load previous session stats: {e}");
        }

        stats
    }

    pub fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame_unavailable(&self) {
        self.frames_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_face(&self) {
        self.no_face_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.malformed_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_detect_error(&self) {
        self.detect_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.readings_published.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            frames_unavailable: self.frames_unavailable.load(Ordering::Relaxed),
            no_face_ticks: self.no_face_ticks.load(Ordering::Relaxed),
            malformed_ticks: self.malformed_ticks.load(Ordering::Relaxed),
            detect_errors: self.detect_errors.load(Ordering::Relaxed),
            readings_published: self.readings_published.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let s = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Ticks: {}\n\
             - Frames unavailable: {}\n\
             - Ticks without a face: {}\n\
             - Malformed faces skipped: {}\n\
             - Inference errors: {}\n\
             - Readings published: {}\n\
             - Session duration: {} seconds",
            s.ticks,
            s.frames_unavailable,
            s.no_face_ticks,
            s.malformed_ticks,
            s.detect_errors,
            s.readings_published,
            s.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let json =
                serde_json::to_string_pretty(&self.totals()).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Counters of earlier sessions plus this one.
    pub fn totals(&self) -> PersistedStats {
        let s = self.snapshot();
        let (ticks, unavailable, no_face, malformed, detect_errors, published) =
            match self.previous {
                Some(ref p) => (
                    p.ticks,
                    p.frames_unavailable,
                    p.no_face_ticks,
                    p.malformed_ticks,
                    p.detect_errors,
                    p.readings_published,
                ),
                None => (0, 0, 0, 0, 0, 0),
            };
        PersistedStats {
            ticks: ticks + s.ticks,
            frames_unavailable: unavailable + s.frames_unavailable,
            no_face_ticks: no_face + s.no_face_ticks,
            malformed_ticks: malformed + s.malformed_ticks,
            detect_errors: detect_errors + s.detect_errors,
            readings_published: published + s.readings_published,
            last_updated: Utc::now(),
        }
    }

    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                self.previous = Some(read_persisted(path)?);
            }
        }
        Ok(())
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub ticks: u64,
    pub frames_unavailable: u64,
    pub no_face_ticks: u64,
    pub malformed_ticks: u64,
    pub detect_errors: u64,
    pub readings_published: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedStats {
    pub ticks: u64,
    pub frames_unavailable: u64,
    pub no_face_ticks: u64,
    pub malformed_ticks: u64,
    pub detect_errors: u64,
    pub readings_published: u64,
    pub last_updated: DateTime<Utc>,
}

/// Read persisted counters, e.g. for a status command.
pub fn read_persisted(path: &std::path::Path) -> Result<PersistedStats, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(std::io::Error::other)
}

/// Stats shared between the detection task and its owner.
pub type SharedSessionStats = Arc<SessionStats>;

pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedSessionStats {
    Arc::new(SessionStats::with_persistence(path))
}
