//! Session statistics for the facial stress agent.

pub mod log;

pub use log::{
    create_shared_stats, create_shared_stats_with_persistence, read_persisted, SessionStats,
    SharedSessionStats, StatsSnapshot,
};
