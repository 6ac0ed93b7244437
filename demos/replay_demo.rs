//! Demonstration of the facial stress pipeline on a recorded session.
//!
//! This example shows how to:
//! 1. Start a session with a replay model and a synthetic camera
//! 2. Watch readiness and published readings
//! 3. Render readings as HSI snapshots
//! 4. Shut down and release the camera
//!
//! Run with: cargo run --example replay_demo [recording.jsonl]
//!
//! Without an argument, the bundled `demos/faces.jsonl` is played.

use std::path::PathBuf;
use std::time::Duration;

use facial_stress_agent::{
    stats::create_shared_stats, Config, HsiBuilder, ReadinessState, ReplayModelLoader, Session,
    SyntheticCamera, DISCLAIMER,
};

#[tokio::main]
async fn main() {
    println!("Facial Stress Agent - Replay Demo");
    println!("=================================");
    println!("{DISCLAIMER}");

    let recording = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/faces.jsonl")));

    let config = Config {
        tick_interval: Duration::from_millis(250),
        ..Config::default()
    };

    let camera = SyntheticCamera::new().with_warmup(2);
    let stats = create_shared_stats();
    let mut session = Session::new(camera.clone(), config, stats.clone());
    let readiness = session.readiness();

    println!("Replaying {}", recording.display());
    let state = session.initialize(&ReplayModelLoader::new(&recording)).await;
    println!("Readiness: {:?} ({})", *readiness.borrow(), session.status_message());
    if state != ReadinessState::Ready {
        return;
    }
    println!();

    let hsi = HsiBuilder::new().with_session_id("replay-demo".to_string());
    println!("Instance ID: {}", hsi.instance_id());
    println!();

    let mut readings = session.publications();
    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = readings.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = readings.borrow_and_update().clone();
                let Some(publication) = latest else { continue };

                println!(
                    "frame {:>3}: {:.2} {:<15} eye={:.2} mouth={:.2} brow={:.2}",
                    publication.frame_index,
                    publication.reading.score,
                    publication.reading.label.to_string(),
                    publication.features.eye_openness,
                    publication.features.mouth_tension,
                    publication.features.brow_furrow,
                );
                println!("  {}", hsi.build_json(&publication));
            }
        }
    }

    session.shutdown().await;

    println!();
    println!("{}", stats.summary());
    println!("Camera releases: {}", camera.release_count());
}
