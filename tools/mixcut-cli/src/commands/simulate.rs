//! Dry-run a render against the simulated host.
//!
//! Useful for checking trim math, rate timing, and teardown behavior
//! without touching a real media file or gstreamer.

use std::path::{Path, PathBuf};

use mixcut_host_core::MediaHost;
use mixcut_host_sim::{SimHost, SimHostConfig};
use mixcut_media_model::{builtin_catalog, PlaybackSettings, TrimRange};
use mixcut_playback::wait_until_ready;
use mixcut_render_engine::{RenderOutcome, RenderPipeline, RenderProgress, RenderRequest};

pub fn run(
    duration: f64,
    start: f64,
    end: Option<f64>,
    rate: f64,
    music: bool,
    voice_clarity: bool,
    fps: u32,
) -> anyhow::Result<()> {
    let rate = super::parse_rate(rate)?;

    let mut trim = TrimRange::full(duration);
    let end = end.unwrap_or(duration);
    if !trim.set_bounds(start, end) {
        return Err(anyhow::anyhow!(
            "Invalid trim {start}..{end} for a {duration:.1}s source"
        ));
    }

    let mut host = SimHost::with_config(SimHostConfig {
        video_duration_secs: duration,
        ..SimHostConfig::default()
    });
    let ledger = host.ledger();
    let clock = host.clock();
    let mut scheduler = host.scheduler(fps);

    // Load the source the way the preview surface would, waiting out any
    // simulated load latency before the render starts.
    let preview = host.create_video_element(Path::new("sim://source"))?;
    let metadata = wait_until_ready(preview.as_ref(), &mut scheduler, fps)?;
    println!(
        "Source: {}x{}, {:.1}s",
        metadata.width, metadata.height, metadata.duration_secs
    );
    drop(preview);

    let request = RenderRequest {
        source_path: PathBuf::from("sim://source"),
        trim,
        settings: PlaybackSettings {
            rate,
            voice_clarity,
            ..PlaybackSettings::default()
        },
        music: music.then(|| builtin_catalog()[0].clone()),
    };

    println!(
        "Simulating: {:.1}s .. {:.1}s at {} ({fps} fps)",
        trim.start(),
        trim.end(),
        rate.label()
    );

    let progress_cb: Box<dyn Fn(RenderProgress) + Send> = Box::new(|p| {
        print!("\r  Progress: {:>5.1}% ({:?})  ", p.pct, p.stage);
    });

    let mut pipeline = RenderPipeline::with_fps(Box::new(host), fps);
    pipeline.start(request, Some(progress_cb))?;
    let outcome = pipeline.run_to_completion(&mut scheduler)?;
    println!();

    match outcome {
        RenderOutcome::Completed(export) => {
            println!("Simulated render complete: {}", export.file_name);
            println!("  Frames: {}", export.artifact.frames);
            println!("  Duration: {:.2}s", export.artifact.duration_secs);
            println!("  Simulated wall clock: {:.2}s", clock.now_secs());
        }
        RenderOutcome::Cancelled => println!("Simulated render cancelled"),
    }

    let graphs = ledger.graphs();
    println!(
        "  Teardown: {} graph(s) closed, all elements stopped: {}",
        graphs.iter().filter(|g| g.closed).count(),
        ledger.elements().iter().all(|e| !e.playing)
    );

    Ok(())
}
