//! Facial Stress Agent CLI
//!
//! Heuristic stress estimation from facial landmarks.

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use facial_stress_agent::{
    config::Config,
    core::{HsiBuilder, Publication, ReadinessState},
    session::Session,
    stats::{create_shared_stats_with_persistence, read_persisted},
    vision::{ReplayModelLoader, SyntheticCamera},
    DISCLAIMER, VERSION,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "facial-stress")]
#[command(version = VERSION)]
#[command(about = "Heuristic stress estimation from facial landmarks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run detection and print each new reading
    Run {
        /// Recorded detections to replay (JSON Lines, one frame per line)
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Delay between detection ticks in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,

        /// Print readings as HSI JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show configuration and cumulative statistics
    Status,

    /// Show configuration file path and contents
    Config,

    /// Display the usage disclaimer
    Disclaimer,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not load config, using defaults: {e}");
        Config::default()
    });
    init_tracing(&config.log_level);

    let result = match cli.command {
        Commands::Run {
            replay,
            tick_ms,
            duration,
            json,
        } => cmd_run(config, replay, tick_ms, duration, json).await,
        Commands::Status => cmd_status(&config),
        Commands::Config => cmd_config(&config),
        Commands::Disclaimer => {
            println!("{DISCLAIMER}");
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Install the tracing subscriber. `RUST_LOG` overrides the configured level.
/// Logs go to stderr so JSON output on stdout stays clean.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    if let Err(e) = tracing_subscriber::registry().with(filter).with(layer).try_init() {
        eprintln!("Warning: could not initialize logging: {e}");
    }
}

async fn cmd_run(
    mut config: Config,
    replay: Option<PathBuf>,
    tick_ms: Option<u64>,
    duration: Option<u64>,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let replay = replay
        .or_else(|| config.replay_path.clone())
        .context("no recording given: pass --replay <file> or set replay_path in the config")?;
    if let Some(ms) = tick_ms {
        anyhow::ensure!(ms > 0, "--tick-ms must be positive");
        config.tick_interval = Duration::from_millis(ms);
    }
    if let Err(e) = config.ensure_directories() {
        tracing::warn!("could not create data directory: {e}");
    }

    if !json {
        println!("Facial Stress Agent v{VERSION}");
        println!("{DISCLAIMER}");
        println!("  Replay: {}", replay.display());
        println!("  Tick interval: {}ms", config.tick_interval.as_millis());
        println!();
    }

    let stats = create_shared_stats_with_persistence(config.stats_path());
    let mut session = Session::new(SyntheticCamera::new(), config, stats.clone());

    let state = session.initialize(&ReplayModelLoader::new(replay)).await;
    if state != ReadinessState::Ready {
        eprintln!("{}", session.status_message());
        return Ok(ExitCode::FAILURE);
    }

    if !json {
        println!("Press Ctrl+C to stop");
        println!();
    }

    let hsi = HsiBuilder::new().with_session_id(format!("run-{}", chrono::Utc::now().timestamp_millis()));
    let mut readings = session.publications();

    let deadline = async {
        match duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(deadline, ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = &mut deadline => break,
            changed = readings.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = readings.borrow_and_update().clone();
                if let Some(publication) = latest {
                    if json {
                        println!("{}", hsi.build_json(&publication));
                    } else {
                        print_reading(&publication);
                    }
                }
            }
        }
    }

    if !json {
        println!();
        println!("Stopping detection...");
    }
    session.shutdown().await;

    if let Err(e) = stats.save() {
        tracing::warn!("could not save session stats: {e}");
    }
    if !json {
        println!();
        println!("{}", stats.summary());
    }

    Ok(ExitCode::SUCCESS)
}

fn print_reading(publication: &Publication) {
    let f = &publication.features;
    println!(
        "[{}] frame {:>6}  score {:.2}  {:<15}  (eye {:.2}, mouth {:.2}, brow {:.2})",
        publication.observed_at.with_timezone(&Local).format("%H:%M:%S"),
        publication.frame_index,
        publication.reading.score,
        publication.reading.label.to_string(),
        f.eye_openness,
        f.mouth_tension,
        f.brow_furrow
    );
}

fn cmd_status(config: &Config) -> anyhow::Result<ExitCode> {
    println!("Facial Stress Agent Status");
    println!("==========================");
    println!();
    println!("Configuration:");
    println!("  Tick interval: {}ms", config.tick_interval.as_millis());
    println!(
        "  Camera: {}x{}",
        config.camera.width, config.camera.height
    );
    println!("  Max faces: {}", config.model.max_faces);
    match config.replay_path {
        Some(ref path) => println!("  Replay: {}", path.display()),
        None => println!("  Replay: (none)"),
    }
    println!();

    let stats_path = config.stats_path();
    if stats_path.exists() {
        let stats = read_persisted(&stats_path)
            .with_context(|| format!("reading {}", stats_path.display()))?;
        println!("Cumulative Statistics:");
        println!("  Ticks: {}", stats.ticks);
        println!("  Ticks without a face: {}", stats.no_face_ticks);
        println!("  Malformed faces skipped: {}", stats.malformed_ticks);
        println!("  Inference errors: {}", stats.detect_errors);
        println!("  Readings published: {}", stats.readings_published);
        println!("  Last updated: {}", stats.last_updated.to_rfc3339());
    } else {
        println!("No previous session data found.");
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_config(config: &Config) -> anyhow::Result<ExitCode> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}
