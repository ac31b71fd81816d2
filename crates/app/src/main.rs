use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use rehab_reps_core::{
    EngineConfig, ExerciseRule, FrameOutcome, LandmarkFrame, ManualClock, RepCounterEngine,
    SessionReport,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() -> rehab_reps_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Exercises => list_exercises(),
        Commands::Replay {
            exercise,
            frames,
            config,
            quiet,
        } => run_replay(&exercise, &frames, config.as_deref(), quiet),
    }
}

fn list_exercises() -> rehab_reps_core::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for rule in ExerciseRule::supported() {
        writeln!(
            out,
            "{:<16} {:>7.2} / {:<7.2} {} -> {}",
            rule.name,
            rule.high_threshold,
            rule.low_threshold,
            rule.extended_label,
            rule.contracted_label
        )?;
    }
    Ok(())
}

fn run_replay(
    exercise: &str,
    frames: &Path,
    config: Option<&Path>,
    quiet: bool,
) -> rehab_reps_core::Result<()> {
    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    tracing::info!(
        exercise,
        frames = ?frames,
        cooldown_ms = config.cooldown_ms,
        "replaying landmark stream"
    );

    let reader: Box<dyn BufRead> = if frames.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(frames)?))
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let report = replay(reader, &mut out, exercise, config, quiet)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    Ok(())
}

/// Feeds every decodable line of `reader` through a fresh session and
/// returns its report. Lines that cannot be decoded, including ones that
/// are not valid UTF-8, are logged and skipped.
fn replay<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    exercise: &str,
    config: EngineConfig,
    quiet: bool,
) -> rehab_reps_core::Result<SessionReport> {
    // Recorded timestamps drive the cooldown so replays are deterministic.
    let clock = ManualClock::new();
    let mut engine = RepCounterEngine::with_clock(config, clock.clone())?;
    let handle = engine.start_session(exercise);
    let mut last_timestamp = 0;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let frame = match LandmarkFrame::from_json(&line) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(line = index + 1, %err, "skipping malformed frame");
                continue;
            }
        };
        if frame.timestamp_ms < last_timestamp {
            tracing::warn!(line = index + 1, "frame timestamp went backwards, skipping");
            continue;
        }
        last_timestamp = frame.timestamp_ms;

        clock.set_millis(frame.timestamp_ms);
        let outcome = engine.evaluate(handle, &frame)?;

        if !quiet {
            let state = engine.state(handle)?;
            let line = FrameLine {
                timestamp_ms: frame.timestamp_ms,
                reps: state.rep_count,
                stage: state.stage_label,
                feedback: &state.last_feedback,
                outcome,
            };
            writeln!(out, "{}", serde_json::to_string(&line)?)?;
        }
    }

    let report = engine.report(handle)?;
    engine.end_session(handle);
    tracing::info!(
        reps = report.reps,
        points = report.points,
        level = report.level,
        "replay finished"
    );
    Ok(report)
}

#[derive(Serialize)]
struct FrameLine<'a> {
    timestamp_ms: u64,
    reps: u32,
    stage: &'a str,
    feedback: &'a str,
    outcome: FrameOutcome,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Counts exercise repetitions from landmark streams",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the exercises the counter understands.
    Exercises,
    /// Replay a JSON-lines landmark recording through a fresh session.
    Replay {
        /// Exercise name, e.g. "Squats".
        #[arg(short, long)]
        exercise: String,
        /// Recording with one frame per line, or `-` for stdin.
        #[arg(short, long)]
        frames: PathBuf,
        /// Optional JSON engine configuration.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Only print the final report.
        #[arg(short, long)]
        quiet: bool,
    },
}
