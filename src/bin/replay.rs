use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tilt_tracker_rs::{
    DisplayConvention, OrientationEstimate, OrientationEstimator, RawSample, ScreenRotation,
    TrackerConfig,
};

/// Replay recorded device-orientation events through the estimator.
#[derive(Parser, Debug)]
#[command(name = "tilt_replay")]
struct Args {
    /// JSON-lines file of orientation events (stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Tracker config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Screen rotation for records without one (0, 90, 180, -90)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    screen: i32,

    /// Display convention override (plain, compass, mirrored)
    #[arg(long)]
    convention: Option<String>,

    /// Yaw blend band below the gimbal-lock threshold
    #[arg(long)]
    blend_band: Option<f64>,

    /// Print only a summary instead of one estimate per event
    #[arg(long, default_value_t = false)]
    summary: bool,
}

#[derive(Deserialize)]
struct Record {
    #[serde(flatten)]
    sample: RawSample,
    #[serde(default)]
    screen: Option<i32>,
    #[serde(default)]
    reset: bool,
}

#[derive(Serialize)]
struct Output {
    line: usize,
    #[serde(flatten)]
    estimate: OrientationEstimate,
}

#[derive(Serialize)]
struct Summary {
    processed: u64,
    dropped: u64,
    resets: u64,
    malformed: u64,
    last: OrientationEstimate,
}

fn load_config(args: &Args) -> anyhow::Result<TrackerConfig> {
    let mut config = match &args.config {
        Some(path) => TrackerConfig::from_json_file(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(name) = &args.convention {
        config.convention = match DisplayConvention::by_name(name) {
            Some(convention) => convention,
            None => bail!("Unknown convention '{name}' (expected plain, compass or mirrored)"),
        };
    }
    if let Some(band) = args.blend_band {
        config.fusion.singularity_blend_band = band;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let default_screen = ScreenRotation::from_degrees(args.screen)?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut estimator = OrientationEstimator::new(config.fusion, config.convention);
    let mut resets = 0u64;
    let mut malformed = 0u64;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let record: Record = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                malformed += 1;
                log::warn!("Line {line_no}: skipping malformed record: {e}");
                continue;
            }
        };

        if record.reset {
            estimator.reset();
            resets += 1;
        }

        let screen = match record.screen.map(ScreenRotation::from_degrees) {
            Some(Ok(screen)) => screen,
            Some(Err(e)) => {
                log::warn!("Line {line_no}: {e}, using default screen rotation");
                default_screen
            }
            None => default_screen,
        };

        if let Some(estimate) = estimator.update(&record.sample, screen) {
            if !args.summary {
                serde_json::to_writer(&mut out, &Output { line: line_no, estimate })?;
                writeln!(out)?;
            }
        }
    }

    if args.summary {
        let summary = Summary {
            processed: estimator.samples_processed(),
            dropped: estimator.samples_dropped(),
            resets,
            malformed,
            last: estimator.estimate(),
        };
        serde_json::to_writer_pretty(&mut out, &summary)?;
        writeln!(out)?;
    }

    Ok(())
}
