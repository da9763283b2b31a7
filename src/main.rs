//! Gesture control from recorded face landmarks: replays a landmark recording
//! (optionally alongside its video frames) and prints gesture events as JSON lines.

use anyhow::{Context, Result};
use clap::Parser;
use face_gesture_control::{
    config::{Config, EXAMPLE_CONFIG},
    events::EventEmitter,
    pipeline::{GesturePipeline, Session, SessionEnd},
    source::{
        BlankFrameSource, FrameSource, ImageSequenceSource, LandmarkProvider, RecordedLandmarks,
        TimeoutLandmarkProvider,
    },
    video::{DirectorySink, NullSink, VideoSink},
};
use log::{info, warn};
use std::io::BufRead;
use std::thread;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Landmark recording (JSON lines, one frame per line)
    #[arg(short, long)]
    landmarks: Option<String>,

    /// Directory of video frames matching the recording
    #[arg(short, long)]
    frames: Option<String>,

    /// Directory to write the forwarded (mirrored) JPEG frames to
    #[arg(short, long)]
    out_dir: Option<String>,

    /// Head direction hysteresis in degrees (overrides the config file)
    #[arg(long)]
    hysteresis: Option<f64>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("Face Gesture Control");

    // Load configuration if provided
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    if let Some(hysteresis) = args.hysteresis {
        config.detection.hysteresis_deg = hysteresis;
    }
    config.validate()?;

    let landmarks_path = args
        .landmarks
        .context("--landmarks is required (see --help)")?;
    let recording = RecordedLandmarks::from_path(&landmarks_path)
        .with_context(|| format!("Failed to load landmarks from {landmarks_path}"))?
        .with_accepted_counts(config.provider.accepted_landmark_counts.clone());

    // Without video, replay one blank frame per recorded entry
    let source: Box<dyn FrameSource> = match &args.frames {
        Some(dir) => Box::new(ImageSequenceSource::new(dir)?),
        None => Box::new(BlankFrameSource::new(recording.len(), 640, 480)),
    };

    let provider: Box<dyn LandmarkProvider> = match config.provider_timeout() {
        Some(timeout) => Box::new(TimeoutLandmarkProvider::new(recording, timeout)?),
        None => Box::new(recording),
    };

    let sink: Box<dyn VideoSink> = match &args.out_dir {
        Some(dir) => Box::new(DirectorySink::new(dir)?),
        None => Box::new(NullSink::default()),
    };

    // Print events from a subscriber thread so the frame loop never waits on stdout
    let emitter = EventEmitter::new(config.events.subscriber_capacity);
    let subscription = emitter.subscribe();
    let printer = thread::Builder::new()
        .name("event-printer".to_string())
        .spawn(move || {
            for event in subscription {
                match event.to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!("Failed to serialize {:?}: {}", event, e),
                }
            }
        })?;

    let pipeline = GesturePipeline::new(config.create_classifier()?);
    let mut session = Session::new(source, provider, emitter, sink)
        .with_encoder(config.create_encoder())
        .with_pipeline(pipeline);

    // Type "q" + Enter to stop between frames
    let stop = session.stop_signal();
    thread::Builder::new().name("stdin-stop".to_string()).spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(std::result::Result::ok) {
            if line.trim() == "q" {
                stop.stop();
                break;
            }
        }
    })?;

    let summary = session.run()?;
    let stats = {
        let (emitter, _sink) = session.into_parts();
        emitter.stats()
    };

    if printer.join().is_err() {
        warn!("Event printer thread panicked");
    }

    info!(
        "Blinks: {}, final head direction: {}, events delivered: {}, dropped: {}",
        summary.state.blink.total_blinks,
        summary.state.head_direction,
        stats.delivered,
        stats.dropped_full + stats.dropped_no_subscriber
    );
    if let SessionEnd::SourceFailed(reason) = &summary.end {
        warn!("Session ended early: {}", reason);
    }

    Ok(())
}
