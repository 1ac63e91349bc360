//! End-to-end render loop harness.
//!
//! Drives the full render pipeline against the simulated host through a
//! set of scenarios (normal, fast, cancelled, degraded music) and checks
//! the invariants the UI depends on: monotonic progress, correct artifact
//! duration, and a clean teardown after every exit path.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use mixcut_host_core::TickScheduler;
use mixcut_host_sim::{SimFaults, SimHost, SimHostConfig};
use mixcut_media_model::{builtin_catalog, PlaybackRate, PlaybackSettings, TrimRange};
use mixcut_render_engine::{
    RenderOutcome, RenderPipeline, RenderProgress, RenderRequest, RenderStatus, TickOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Capture frame rate for every scenario
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Trim start in seconds
    #[arg(long, default_value_t = 2.0)]
    start: f64,

    /// Trim end in seconds
    #[arg(long, default_value_t = 5.0)]
    end: f64,
}

#[derive(Debug, serde::Serialize)]
struct ScenarioReport {
    name: &'static str,
    frames: u64,
    artifact_duration_secs: f64,
    sim_wall_clock_secs: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mixcut_render_engine=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    tracing::info!("Starting E2E render loop ({} fps)", args.fps);

    let mut reports = Vec::new();
    for scenario in [Scenario::Normal, Scenario::DoubleRate, Scenario::Cancelled, Scenario::DegradedMusic] {
        let args_copy = ArgsCopy::from(&args);
        let report = tokio::task::spawn_blocking(move || run_scenario(scenario, args_copy))
            .await
            .context("scenario task panicked")??;
        tracing::info!(name = report.name, frames = report.frames, "scenario passed");
        reports.push(report);
    }

    println!("{}", serde_json::to_string_pretty(&reports)?);
    tracing::info!("All {} scenarios passed", reports.len());
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Scenario {
    Normal,
    DoubleRate,
    Cancelled,
    DegradedMusic,
}

#[derive(Debug, Clone, Copy)]
struct ArgsCopy {
    fps: u32,
    start: f64,
    end: f64,
}

impl From<&Args> for ArgsCopy {
    fn from(args: &Args) -> Self {
        Self {
            fps: args.fps,
            start: args.start,
            end: args.end,
        }
    }
}

fn run_scenario(scenario: Scenario, args: ArgsCopy) -> Result<ScenarioReport> {
    let frame = 1.0 / args.fps as f64;
    let span = args.end - args.start;

    let (name, rate, music, faults) = match scenario {
        Scenario::Normal => ("normal", PlaybackRate::Normal, false, SimFaults::default()),
        Scenario::DoubleRate => ("double-rate", PlaybackRate::Double, true, SimFaults::default()),
        Scenario::Cancelled => ("cancelled", PlaybackRate::Normal, true, SimFaults::default()),
        Scenario::DegradedMusic => (
            "degraded-music",
            PlaybackRate::Normal,
            true,
            SimFaults {
                fail_source_after: Some(1),
                ..SimFaults::default()
            },
        ),
    };

    let host = SimHost::with_config(SimHostConfig {
        faults,
        ..SimHostConfig::default()
    });
    let ledger = host.ledger();
    let clock = host.clock();
    let mut scheduler = host.scheduler(args.fps);

    let mut trim = TrimRange::full(60.0);
    if !trim.set_bounds(args.start, args.end) {
        anyhow::bail!("invalid trim {}..{}", args.start, args.end);
    }
    let request = RenderRequest {
        source_path: PathBuf::from("sim://e2e"),
        trim,
        settings: PlaybackSettings {
            rate,
            ..PlaybackSettings::default()
        },
        music: music.then(|| builtin_catalog()[0].clone()),
    };

    let history: Arc<Mutex<Vec<RenderProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&history);

    let mut pipeline = RenderPipeline::with_fps(Box::new(host), args.fps);
    let cancel = pipeline
        .start(request, Some(Box::new(move |p| sink.lock().unwrap().push(p))))
        .context("start failed")?;

    let outcome = if matches!(scenario, Scenario::Cancelled) {
        loop {
            scheduler.wait_tick();
            if history.lock().unwrap().last().is_some_and(|p| p.pct >= 50.0) {
                cancel.cancel();
            }
            if let TickOutcome::Finished(outcome) = pipeline.tick().context("tick failed")? {
                break outcome;
            }
        }
    } else {
        pipeline
            .run_to_completion(&mut scheduler)
            .context("run failed")?
    };

    // Progress must never decrease, on any exit path.
    let pcts: Vec<f64> = history.lock().unwrap().iter().map(|p| p.pct).collect();
    if pcts.windows(2).any(|w| w[1] < w[0]) {
        anyhow::bail!("[{name}] progress decreased: {pcts:?}");
    }

    // Teardown invariants hold for every scenario.
    if pipeline.status() != RenderStatus::Done && pipeline.status() != RenderStatus::Idle {
        anyhow::bail!("[{name}] pipeline stuck in {:?}", pipeline.status());
    }
    let graphs = ledger.graphs();
    if !graphs.iter().all(|g| g.closed && g.close_count == 1) {
        anyhow::bail!("[{name}] audio graph not closed exactly once");
    }
    if ledger.elements().iter().any(|e| e.playing) {
        anyhow::bail!("[{name}] an element is still playing after teardown");
    }

    let (frames, duration) = match outcome {
        RenderOutcome::Completed(export) => {
            if matches!(scenario, Scenario::Cancelled) {
                anyhow::bail!("[{name}] cancelled render produced an artifact");
            }
            let expected = span / rate.as_f64();
            if (export.artifact.duration_secs - expected).abs() > frame {
                anyhow::bail!(
                    "[{name}] artifact duration {:.3}s, expected {expected:.3}s",
                    export.artifact.duration_secs
                );
            }
            if pcts.last().copied() != Some(100.0) {
                anyhow::bail!("[{name}] progress never reached 100");
            }
            (export.artifact.frames, export.artifact.duration_secs)
        }
        RenderOutcome::Cancelled => {
            if !matches!(scenario, Scenario::Cancelled) {
                anyhow::bail!("[{name}] unexpected cancellation");
            }
            let recorders = ledger.recorders();
            if !recorders.iter().all(|r| r.discarded && !r.stopped) {
                anyhow::bail!("[{name}] cancelled recording was not discarded");
            }
            (0, 0.0)
        }
    };

    if matches!(scenario, Scenario::DegradedMusic) && graphs[0].sources_created != 1 {
        anyhow::bail!(
            "[{name}] expected music source to be skipped, got {} sources",
            graphs[0].sources_created
        );
    }

    Ok(ScenarioReport {
        name,
        frames,
        artifact_duration_secs: duration,
        sim_wall_clock_secs: clock.now_secs(),
    })
}
