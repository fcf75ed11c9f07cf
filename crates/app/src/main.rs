use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    thread,
    time::Instant,
};

use clap::{Parser, Subcommand};
use cue_engine_core::{
    load_track, CueId, CueScheduler, EngineConfig, EvaluationMode, PlaybackSession, RecordingSink,
    TickOutcome, TrackDeck, TriggerCatalog, TriggerRule,
};
use tracing_subscriber::EnvFilter;

fn main() -> cue_engine_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            track,
            config,
            mode,
            cadence_ms,
            clip_ticks,
            realtime,
        } => {
            let mut engine = match config {
                Some(path) => EngineConfig::load(&path)?,
                None => EngineConfig::default(),
            };
            if let Some(mode) = mode {
                engine.scheduler.mode = mode;
            }
            if let Some(cadence_ms) = cadence_ms {
                engine.scheduler.cadence_ms = cadence_ms;
            }
            run_track(&track, &engine, clip_ticks, realtime)
        }
        Commands::Inspect { track } => inspect_track(&track),
        Commands::Presets => print_presets(),
    }
}

fn run_track(
    path: &Path,
    config: &EngineConfig,
    clip_ticks: Option<u32>,
    realtime: bool,
) -> cue_engine_core::Result<()> {
    tracing::info!(
        ?path,
        mode = %config.scheduler.mode,
        cadence_ms = config.scheduler.cadence_ms,
        "running track"
    );

    let track = load_track(path).into_result()?;
    let catalog = if config.use_default_presets {
        TriggerCatalog::with_default_presets()
    } else {
        TriggerCatalog::new()
    };
    if catalog.is_empty() {
        tracing::warn!("trigger catalog is empty, no cues will fire");
    }

    let mut scheduler = CueScheduler::new(config.scheduler.clone());
    if let Err(err) = scheduler.bind(track, catalog) {
        tracing::warn!(error = %err, "cannot play this track, no cues will fire");
        return Err(err);
    }

    let sink = match clip_ticks {
        Some(ticks) => RecordingSink::with_clip_length(ticks),
        None => RecordingSink::new(),
    };
    let name = path.display().to_string();
    let mut session = PlaybackSession::new(TrackDeck::new([name]), sink, scheduler);
    session.begin(0)?;

    let mut counts: BTreeMap<CueId, usize> = BTreeMap::new();
    if realtime {
        let cadence = config.scheduler.cadence();
        let mut last = Instant::now();
        while session.scheduler().is_running() {
            thread::sleep(cadence);
            let now = Instant::now();
            for outcome in session.update(now - last) {
                record(&outcome, &mut counts);
                session.sink_mut().elapse();
            }
            last = now;
        }
    } else {
        while session.scheduler().is_running() {
            let outcome = session.tick();
            record(&outcome, &mut counts);
            session.sink_mut().elapse();
        }
    }
    session.end();

    let frames = session.scheduler().cursor();
    println!("evaluated {frames} frames");
    for cue in CueId::ALL {
        println!("{cue:>13}: {}", counts.get(&cue).copied().unwrap_or(0));
    }
    Ok(())
}

fn record(outcome: &TickOutcome, counts: &mut BTreeMap<CueId, usize>) {
    let Some(report) = outcome.report() else {
        return;
    };
    for cue in &report.activated {
        tracing::info!(frame = report.index, %cue, "cue activated");
        *counts.entry(*cue).or_default() += 1;
    }
}

fn inspect_track(path: &Path) -> cue_engine_core::Result<()> {
    let track = load_track(path).into_result()?;
    let summary = track.summary();

    println!("bpm:    {}", summary.bpm);
    println!("frames: {}", summary.frame_count);
    for (name, stats) in [
        ("energy", summary.energy),
        ("flux", summary.spectral_flux),
        ("centroid", summary.spectral_centroid),
    ] {
        println!(
            "{name:>8}: min {:.3}  max {:.3}  mean {:.3}",
            stats.min, stats.max, stats.mean
        );
    }
    Ok(())
}

fn print_presets() -> cue_engine_core::Result<()> {
    let catalog = TriggerCatalog::with_default_presets();
    let rules: Vec<&TriggerRule> = catalog.rules().collect();
    let json = serde_json::to_string_pretty(&rules)?;
    println!("{json}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-reactive animation cue engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a feature track against the default trigger presets.
    Run {
        /// JSON feature track produced by the offline analyser.
        track: PathBuf,
        /// Optional engine configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// `matched-only` or `explicit-deactivate`.
        #[arg(short, long)]
        mode: Option<EvaluationMode>,
        /// Milliseconds between two frames.
        #[arg(long)]
        cadence_ms: Option<u64>,
        /// Let each activation play for this many frames before it may fire again.
        #[arg(long)]
        clip_ticks: Option<u32>,
        /// Pace ticks with the wall clock instead of running as fast as possible.
        #[arg(long)]
        realtime: bool,
    },
    /// Print per-feature statistics for a feature track.
    Inspect {
        track: PathBuf,
    },
    /// Print the curated trigger presets as JSON.
    Presets,
}
