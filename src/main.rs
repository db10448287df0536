//! digit-pad entry point
//!
//! Replays a recorded gesture trace (or a built-in demo stroke) through
//! the full pipeline: stroke capture, MNIST-style preprocessing, and ONNX
//! classification, then prints the confidence distribution.

mod app;
mod canvas;
mod classify;
mod config;
mod debounce;
mod input;
mod preprocess;
mod render;
mod shared;
mod trace;
mod trigger;

use anyhow::{bail, Context, Result};
use clap::Parser;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::app::DigitPad;
use crate::config::AppConfig;
use crate::shared::PadState;
use crate::trace::GestureTrace;

#[derive(Parser, Debug)]
#[command(name = "digit-pad")]
#[command(about = "Freehand digit sketchpad - replay gesture traces through an MNIST classifier")]
struct Args {
    /// Gesture trace (JSON) to replay; omit for a built-in demo stroke
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// ONNX model path (overrides config and the model cache)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Configuration file (default: the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the classifier input as ASCII art before predicting
    #[arg(long)]
    ascii: bool,

    /// Download and verify the model, then exit
    #[arg(long)]
    fetch_model: bool,

    /// Write the built-in demo trace to a JSON file and exit; a starting
    /// point for hand-edited traces
    #[arg(long, value_name = "PATH")]
    write_demo: Option<PathBuf>,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set up logging")?;

    let args = Args::parse();

    if let Some(path) = &args.write_demo {
        GestureTrace::demo_stroke().save(path)?;
        println!("demo trace written to {}", path.display());
        return Ok(());
    }

    let mut config = load_or_create_config(args.config.as_deref())?;
    if let Some(model) = args.model {
        config.classifier.model_path = Some(model);
    }

    if args.fetch_model {
        let path = fetch_model(&config)?;
        println!("model ready at {}", path.display());
        return Ok(());
    }

    let trace = match &args.trace {
        Some(path) => GestureTrace::from_path(path)?,
        None => {
            info!("no trace given, replaying the built-in demo stroke");
            GestureTrace::demo_stroke()
        }
    };

    let pad = DigitPad::new(config);
    wait_for_classifier(&pad.state())?;

    trace.replay(&pad);

    if args.ascii {
        match preprocess::frame_to_tensor(&pad.surface_snapshot(), pad.preprocess_config()) {
            Ok(tensor) => println!("{}", tensor.ascii_art()),
            Err(e) => info!("no classifier input to show: {e}"),
        }
    }

    if wait_for_prediction(&pad.state(), Duration::from_secs(10)) {
        print_distribution(&pad.state());
    } else {
        println!("no prediction (trace left the canvas empty)");
    }
    Ok(())
}

/// Loads the config file, writing a default one on first run.
fn load_or_create_config(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config::config_path()?,
    };
    if path.exists() {
        info!("loading config from {:?}", path);
        return config::load_config(&path);
    }
    let config = AppConfig::default();
    if let Err(e) = config::save_config(&config, &path) {
        warn!("could not write default config to {:?}: {e}", path);
    } else {
        info!("created default config at {:?}", path);
    }
    Ok(config)
}

fn fetch_model(config: &AppConfig) -> Result<PathBuf> {
    let mut last_decile = 0;
    classify::model::ensure_model(&config.classifier, |downloaded, total| {
        if let Some(total) = total.filter(|t| *t > 0) {
            let decile = downloaded * 10 / total;
            if decile > last_decile {
                last_decile = decile;
                info!("model download {}%", decile * 10);
            }
        }
    })
}

/// Blocks until the classifier is ready, logging progress along the way.
fn wait_for_classifier(state: &Arc<RwLock<PadState>>) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs(330);
    let mut last_logged = 0;
    loop {
        {
            let state = state.read();
            if state.is_classifier_ready() {
                return Ok(());
            }
            if let Some(error) = state.last_error() {
                bail!("classifier failed to load: {error}");
            }
            let progress = state.loading_progress();
            if progress >= last_logged + 10 {
                last_logged = progress - progress % 10;
                info!("loading classifier... {progress}%");
            }
        }
        if Instant::now() > deadline {
            bail!("classifier did not become ready in time");
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}

/// Waits for the replayed trace's prediction to land.
fn wait_for_prediction(state: &Arc<RwLock<PadState>>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if state.read().predicted_class().is_some() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    state.read().predicted_class().is_some()
}

fn print_distribution(state: &Arc<RwLock<PadState>>) {
    let state = state.read();
    let predicted = state.predicted_class();
    for (digit, &score) in state.output().scores().iter().enumerate() {
        let bar = "#".repeat((score.clamp(0.0, 1.0) * 40.0).round() as usize);
        let marker = if predicted == Some(digit) { "  <-" } else { "" };
        println!("{digit}: {score:>6.3} {bar}{marker}");
    }
    match predicted {
        Some(digit) => println!("predicted digit: {digit}"),
        None => println!("no prediction"),
    }
}
