// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sketchplay CLI
//!
//! Replays a recorded sketch session headlessly from a data directory and
//! reports what the view would have shown.

use clap::{Parser, Subcommand};
use sketchplay_sequencer::{
    ConfigError, DirectorySource, LoadError, NullSink, PlayOutcome, PlayerConfig, PoseSink,
    RevealSink, RigPose, SavedCut, SketchLoader, SketchSession, StrokeSegment, ViewBindings,
};
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "sketchplay")]
#[command(about = "Headless replay of recorded sketch sessions")]
#[command(version)]
struct Cli {
    /// Player configuration (RON)
    #[arg(long, global = true, default_value = "sketchplay.ron")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a sketch
    Play {
        /// Sketch name (directory under the data root)
        sketch: String,

        /// Data root, overriding the configuration
        #[arg(long)]
        root: Option<PathBuf>,

        /// Simulated frame rate
        #[arg(long, default_value = "60")]
        fps: f64,

        /// Playback rate
        #[arg(long, default_value = "1.0")]
        rate: f64,

        /// Start position as a ratio of the duration
        #[arg(long)]
        seek: Option<f64>,

        /// Saved cut list (JSON, seconds) to play in edit mode
        #[arg(long)]
        cuts: Option<PathBuf>,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<u64>,

        /// Pace frames in wall-clock time
        #[arg(long)]
        realtime: bool,
    },

    /// Show what a sketch contains
    Info {
        /// Sketch name (directory under the data root)
        sketch: String,

        /// Data root, overriding the configuration
        #[arg(long)]
        root: Option<PathBuf>,
    },

    /// Write the default configuration
    InitConfig,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to read cuts from {path}: {source}")]
    CutsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid cut list: {0}")]
    CutsParse(#[from] serde_json::Error),

    #[error("Frame rate must be positive, got {0}")]
    InvalidFps(f64),
}

/// Counts live stroke segments across every brush
struct SegmentCounter(Rc<Cell<i64>>);

impl RevealSink<StrokeSegment> for SegmentCounter {
    fn reveal(&mut self, _segment: &StrokeSegment) {
        self.0.set(self.0.get() + 1);
    }

    fn hide(&mut self, _segment: &StrokeSegment) {
        // Hides also arrive for segments that were never revealed
        self.0.set((self.0.get() - 1).max(0));
    }
}

/// Remembers the last headset position
struct HeadTracker(Rc<Cell<[f32; 3]>>);

impl PoseSink for HeadTracker {
    fn pose(&mut self, rig: &RigPose) {
        self.0.set(rig.hmd.position);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("sketchplay=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = PlayerConfig::load(&cli.config)?;

    match cli.command {
        Commands::Play {
            sketch,
            root,
            fps,
            rate,
            seek,
            cuts,
            max_frames,
            realtime,
        } => {
            play(
                config,
                PlayArgs {
                    sketch,
                    root,
                    fps,
                    rate,
                    seek,
                    cuts,
                    max_frames,
                    realtime,
                },
            )
            .await
        }
        Commands::Info { sketch, root } => show_info(config, sketch, root).await,
        Commands::InitConfig => {
            config.save(&cli.config)?;
            info!("Wrote {}", cli.config.display());
            Ok(())
        }
    }
}

struct PlayArgs {
    sketch: String,
    root: Option<PathBuf>,
    fps: f64,
    rate: f64,
    seek: Option<f64>,
    cuts: Option<PathBuf>,
    max_frames: Option<u64>,
    realtime: bool,
}

fn session_for(
    config: PlayerConfig,
    root: Option<PathBuf>,
) -> SketchSession<DirectorySource> {
    let root = root.unwrap_or_else(|| config.data_root.clone());
    let loader = SketchLoader::new(DirectorySource::new(root), config.video);
    SketchSession::new(loader, config)
}

async fn play(config: PlayerConfig, args: PlayArgs) -> Result<(), CliError> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(CliError::InvalidFps(args.fps));
    }

    let saved_cuts: Option<Vec<SavedCut>> = match &args.cuts {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::CutsIo {
                    path: path.clone(),
                    source,
                })?;
            Some(serde_json::from_str(&text)?)
        }
        None => None,
    };

    let segments = Rc::new(Cell::new(0_i64));
    let head = Rc::new(Cell::new([0.0_f32; 3]));
    let strokes_counter = Rc::clone(&segments);
    let bindings = ViewBindings {
        strokes: Box::new(move |_brush: usize, _name: &str| -> Box<dyn RevealSink<StrokeSegment>> {
            Box::new(SegmentCounter(Rc::clone(&strokes_counter)))
        }),
        input: Box::new(HeadTracker(Rc::clone(&head))),
        straight_edge: Box::new(NullSink),
    };

    let mut session = session_for(config, args.root);
    let player = session.load(&args.sketch, bindings).await?;

    let completed = Rc::new(Cell::new(false));
    let done = Rc::clone(&completed);
    player.playback_complete.subscribe(move |_| done.set(true));

    if let Some(saved) = saved_cuts {
        player.load_saved_cuts(&saved);
        if !player.start_edit_playback_from_cut_list() {
            warn!("Cut list is empty, playing the whole sketch");
        }
    }
    player.set_playback_rate(args.rate);
    if let Some(ratio) = args.seek {
        player.seek(ratio);
    }

    if player.play() == PlayOutcome::AutoplayBlocked {
        warn!("Playback refused to start");
        return Ok(());
    }

    let frame_ms = 1000.0 / args.fps;
    let report_every = args.fps.round().max(1.0) as u64;
    let mut interval = tokio::time::interval(Duration::from_secs_f64(frame_ms / 1000.0));
    let mut frame = 0_u64;

    while player.is_playing() {
        if args.max_frames.is_some_and(|max| frame >= max) {
            info!("Stopping after {frame} frames");
            player.pause();
            break;
        }
        if args.realtime {
            interval.tick().await;
        }

        player.tick(frame_ms);
        frame += 1;

        if frame % report_every == 0 {
            let [x, y, z] = head.get();
            info!(
                "{:6.2}s {:5.1}% segments={} head=({x:.2}, {y:.2}, {z:.2})",
                player.get_current_time(),
                player.progress() * 100.0,
                segments.get()
            );
        }
    }

    info!(
        "Finished at {:.2}s after {frame} frames, {} segments visible, complete={}",
        player.get_current_time(),
        segments.get(),
        completed.get()
    );
    Ok(())
}

async fn show_info(config: PlayerConfig, sketch: String, root: Option<PathBuf>) -> Result<(), CliError> {
    let mut session = session_for(config, root);
    let player = session.load(&sketch, ViewBindings::default()).await?;

    info!("Sketch: {}", player.name());
    info!("Tracks: {}", player.timeline().track_count());
    info!("Data duration: {:.2}s", player.data_duration());
    info!(
        "Clock: {}",
        if player.is_media_driven() { "media" } else { "synthetic" }
    );
    info!("Cuts: {}", player.cut_list().len());
    Ok(())
}
