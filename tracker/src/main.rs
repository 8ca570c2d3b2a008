//! eye-gesture: replay a recorded landmark trace through the gesture
//! tracker and print events as s-expressions.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use eye_gesture::eye::TrackerConfig;
use eye_gesture::pipeline::Pipeline;
use eye_gesture::sexp::TraceReader;

#[derive(Parser, Debug)]
#[command(name = "eye-gesture", about = "Eye gesture tracker (landmark trace replay)")]
struct Cli {
    /// Landmark trace to replay, or `-` for stdin
    #[arg(long)]
    trace: Option<String>,

    /// Print every frame, not just gestures
    #[arg(long)]
    all_frames: bool,

    /// Openness ratio below which an eye counts as closed
    #[arg(long)]
    ear_threshold: Option<f64>,

    /// Shortest single-eye closure reported as a wink (seconds)
    #[arg(long)]
    wink_min: Option<f64>,

    /// Longest single-eye closure reported as a wink (seconds)
    #[arg(long)]
    wink_max: Option<f64>,

    /// Window pairing two both-eyes-closed frames into a double-blink (seconds)
    #[arg(long)]
    double_blink_window: Option<f64>,

    /// Gaze points kept in the trail
    #[arg(long)]
    gaze_history: Option<usize>,

    /// Source frame width in pixels (overridden by trace records)
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Source frame height in pixels (overridden by trace records)
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

impl Cli {
    fn tracker_config(&self) -> TrackerConfig {
        let defaults = TrackerConfig::default();
        TrackerConfig {
            ear_threshold: self.ear_threshold.unwrap_or(defaults.ear_threshold),
            wink_min_s: self.wink_min.unwrap_or(defaults.wink_min_s),
            wink_max_s: self.wink_max.unwrap_or(defaults.wink_max_s),
            double_blink_window_s: self
                .double_blink_window
                .unwrap_or(defaults.double_blink_window_s),
            gaze_history_capacity: self.gaze_history.unwrap_or(defaults.gaze_history_capacity),
            ..defaults
        }
    }
}

fn open_trace(path: &str) -> anyhow::Result<Box<dyn BufRead>> {
    if path == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("opening trace {}", path))?;
    Ok(Box::new(BufReader::new(file)))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("eye-gesture {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Logs on stderr; stdout carries the event stream.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eye_gesture=info".into()),
        )
        .init();

    let Some(path) = cli.trace.as_deref() else {
        bail!("no trace given; pass --trace FILE or --trace - for stdin");
    };

    info!("eye-gesture v{} starting", env!("CARGO_PKG_VERSION"));
    let mut pipeline = Pipeline::new(cli.tracker_config()).context("invalid configuration")?;
    if let (Some(width), Some(height)) = (cli.width, cli.height) {
        pipeline.tracker_mut().set_frame_dimensions(width, height);
    }

    let mut reader = TraceReader::new(open_trace(path)?);
    let all_frames = cli.all_frames;
    pipeline.run(&mut reader, |snap| {
        let gesture = snap.outcome.gesture();
        if all_frames {
            println!("{}", snap.outcome.to_sexp(snap.frame_number));
        } else if !gesture.is_none() {
            let frame = snap.frame_number.to_string();
            let t = format!("{:.3}", snap.outcome.timestamp_s());
            println!(
                "{}",
                eye_gesture::sexp::format_event(
                    gesture.as_str(),
                    &[("frame", frame.as_str()), ("t", t.as_str())],
                )
            );
        }
    })?;

    info!("final tracker state {}", pipeline.tracker().status_sexp());
    println!("{}", pipeline.summary_sexp());
    println!("{}", pipeline.timing_sexp());
    Ok(())
}
