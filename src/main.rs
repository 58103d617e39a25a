use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stance_track_lib::core::frame_source::SyntheticCamera;
use stance_track_lib::platform::audio::Silent;
use stance_track_lib::platform::pose::RecordedPoseEstimator;
use stance_track_lib::{Collaborators, Config, PostureMonitor, SessionStatus};

#[derive(Parser)]
#[command(name = "stance-track")]
#[command(version)]
#[command(about = "Posture classification and session feedback from body landmarks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a posture session over recorded landmark frames
    Replay(ReplayArgs),
}

#[derive(Args)]
struct ReplayArgs {
    /// JSON array of landmark frames (`null` for frames with nobody in view)
    recording: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Frame height in pixels
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Configuration file (default: settings.json in the data directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable speech and alert sounds
    #[arg(long)]
    no_audio: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

async fn replay(args: ReplayArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref())?;

    let estimator = RecordedPoseEstimator::from_file(&args.recording)?;
    info!("Loaded {} recorded frames from {}", estimator.len(), args.recording.display());

    let camera = SyntheticCamera::new(args.width, args.height, args.fps)?;
    let mut collaborators = Collaborators::with_defaults(&config, Arc::new(camera), Arc::new(estimator));
    if args.no_audio {
        collaborators.speech = Arc::new(Silent);
        collaborators.sound = Arc::new(Silent);
    }

    let monitor = PostureMonitor::new(&config, collaborators)?;
    let mut updates = monitor.subscribe();
    monitor.start().await.context("Failed to start posture session")?;

    // The loop stops by itself once the recording runs out
    tokio::select! {
        _ = updates.wait_for(|snapshot| snapshot.status == SessionStatus::Stopped) => {}
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping session");
        }
    }

    let report = monitor.stop().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, the session report to stdout
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => replay(args).await,
    }
}
