//! Render an edit to a webm file via the offline backend.

use std::path::PathBuf;

use mixcut_common::config::AppConfig;
use mixcut_media_model::{builtin_catalog, find_by_id, PlaybackSettings, TrimRange};
use mixcut_render_engine::{
    export_file_name, export_offline, OfflineExportJob, RenderProgress, RenderRequest,
};

pub struct RenderArgs {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub start: f64,
    pub end: Option<f64>,
    pub duration: f64,
    pub rate: f64,
    pub filter: String,
    pub track: Option<String>,
    pub music_volume: f64,
    pub video_volume: f64,
    pub voice_clarity: bool,
    pub hd_upscale: bool,
    pub fps: u32,
}

pub async fn run(args: RenderArgs) -> anyhow::Result<()> {
    let rate = super::parse_rate(args.rate)?;
    let visual_filter = super::parse_filter(&args.filter)?;

    let mut trim = TrimRange::full(args.duration);
    let end = args.end.unwrap_or(args.duration);
    if !trim.set_bounds(args.start, end) {
        return Err(anyhow::anyhow!(
            "Invalid trim {}..{} for a {:.1}s source",
            args.start,
            end,
            args.duration
        ));
    }

    let catalog = builtin_catalog();
    let music = match args.track.as_deref() {
        Some(id) => Some(
            find_by_id(&catalog, id)
                .ok_or_else(|| anyhow::anyhow!("Unknown track id: {id}. See `mixcut tracks`"))?
                .clone(),
        ),
        None => None,
    };

    let output_path = args.output.unwrap_or_else(|| {
        AppConfig::load()
            .exports_dir
            .join(export_file_name(chrono::Utc::now()))
    });

    let request = RenderRequest {
        source_path: args.source,
        trim,
        settings: PlaybackSettings {
            rate,
            visual_filter,
            music_volume: args.music_volume,
            video_volume: args.video_volume,
            voice_clarity: args.voice_clarity,
            hd_upscale: args.hd_upscale,
        },
        music,
    };

    println!("Rendering: {}", request.source_path.display());
    println!("  Trim: {:.1}s .. {:.1}s", trim.start(), trim.end());
    println!("  Rate: {}", rate.label());
    println!("  Filter: {}", visual_filter.label());
    if let Some(ref track) = request.music {
        println!("  Music: {} ({})", track.name, track.mood.as_str());
    }
    println!("  Output: {}", output_path.display());

    let job = OfflineExportJob {
        request,
        output_path: output_path.clone(),
        fps: args.fps,
    };

    let progress_cb: Box<dyn Fn(RenderProgress) + Send> = Box::new(|p| {
        print!(
            "\r  Progress: {:>5.1}% ({:.1}s, {:?})  ",
            p.pct, p.position_secs, p.stage
        );
    });

    let written = tokio::task::spawn_blocking(move || export_offline(&job, Some(progress_cb)))
        .await
        .map_err(|e| anyhow::anyhow!("Render task panicked: {e}"))??;

    println!("\nRender complete: {}", written.display());
    Ok(())
}
