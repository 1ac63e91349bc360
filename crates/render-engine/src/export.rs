//! Offline export backend.
//!
//! Renders an edit straight from the source file on disk: the collapsed
//! render plan (trim window, rate, composed grade, voice chain, music mix)
//! becomes one gstreamer pipeline built from a launch string, with progress
//! sampled from the pipeline clock and EOS drained from the bus. Launch
//! string builders are pure functions; the grade and chain mappings mirror
//! the expressions the interactive pipeline feeds its frame sink.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use gst::prelude::*;
use gstreamer as gst;
use mixcut_common::{MixcutError, MixcutResult};
use mixcut_media_model::{PlaybackSettings, VisualFilter};
use mixcut_processing_core::{AudioChainPlan, AudioStage, ProgressGauge};
use tracing::{debug, info, warn};

use crate::pipeline::{ProgressCallback, RenderProgress, RenderRequest, RenderStatus};

/// One offline export: a render request plus where the file lands.
#[derive(Debug, Clone)]
pub struct OfflineExportJob {
    pub request: RenderRequest,
    pub output_path: PathBuf,
    pub fps: u32,
}

/// Backend that executes an offline export job.
pub trait ExportBackend: Send {
    /// Render the job to its output path.
    fn render(
        &mut self,
        job: &OfflineExportJob,
        progress: Option<ProgressCallback>,
    ) -> MixcutResult<PathBuf>;

    /// Whether this backend can run on the current system.
    fn is_available(&self) -> bool;

    /// Backend name for diagnostics.
    fn name(&self) -> &str;
}

/// Render an export job with the default backend.
pub fn export_offline(
    job: &OfflineExportJob,
    progress: Option<ProgressCallback>,
) -> MixcutResult<PathBuf> {
    if !job.request.source_path.exists() {
        return Err(MixcutError::FileNotFound {
            path: job.request.source_path.clone(),
        });
    }
    if !job.request.trim.is_valid() {
        return Err(MixcutError::render("trim range is empty or inverted"));
    }
    if let Some(parent) = job.output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut backend = GstExportBackend::new();
    if !backend.is_available() {
        return Err(MixcutError::unsupported(
            "no usable export backend (gstreamer failed to initialize)",
        ));
    }
    info!(backend = backend.name(), output = %job.output_path.display(), "offline export starting");
    backend.render(job, progress)
}

/// GStreamer offline backend.
pub struct GstExportBackend;

impl GstExportBackend {
    pub fn new() -> Self {
        Self
    }

    /// Build, preroll, seek, and drain one pipeline. Failures before the
    /// pipeline reaches Paused are reported as preroll failures so the
    /// caller can decide whether to degrade.
    fn run_once(
        &self,
        job: &OfflineExportJob,
        with_music: bool,
        progress: &Option<ProgressCallback>,
    ) -> Result<PathBuf, RunError> {
        let launch = build_export_launch(job, with_music);
        debug!(%launch, "export launch");

        let element = gst::parse::launch(&launch).map_err(|e| {
            RunError::Preroll(MixcutError::render(format!("pipeline build failed: {e}")))
        })?;
        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            RunError::Preroll(MixcutError::render(
                "launch string did not produce a pipeline",
            ))
        })?;

        let result = self.drive(job, &pipeline, progress);
        if let Err(error) = pipeline.set_state(gst::State::Null) {
            warn!(?error, "export pipeline refused to reach Null");
        }
        if result.is_err() {
            // A failed run must not leave a partial artifact behind.
            if let Err(error) = std::fs::remove_file(&job.output_path) {
                if error.kind() != std::io::ErrorKind::NotFound {
                    warn!(%error, "could not remove partial export file");
                }
            }
        }
        result
    }

    fn drive(
        &self,
        job: &OfflineExportJob,
        pipeline: &gst::Pipeline,
        progress: &Option<ProgressCallback>,
    ) -> Result<PathBuf, RunError> {
        pipeline
            .set_state(gst::State::Paused)
            .map_err(|e| RunError::Preroll(MixcutError::media(format!("preroll failed: {e:?}"))))?;
        match pipeline.state(gst::ClockTime::from_seconds(15)) {
            (Ok(_), _, _) => {}
            (Err(e), _, _) => {
                return Err(RunError::Preroll(MixcutError::media(format!(
                    "source cannot be decoded: {e:?}"
                ))));
            }
        }

        let rate = job.request.settings.rate.as_f64();
        let start = job.request.trim.start();
        let end = job.request.trim.end();
        pipeline
            .seek(
                rate,
                gst::SeekFlags::FLUSH | gst::SeekFlags::ACCURATE,
                gst::SeekType::Set,
                gst::ClockTime::from_nseconds((start * 1e9) as u64),
                gst::SeekType::Set,
                gst::ClockTime::from_nseconds((end * 1e9) as u64),
            )
            .map_err(|e| RunError::Fatal(MixcutError::render(format!("trim seek failed: {e}"))))?;

        pipeline.set_state(gst::State::Playing).map_err(|e| {
            RunError::Fatal(MixcutError::render(format!("pipeline start failed: {e:?}")))
        })?;

        let span = job.request.trim.span();
        let mut gauge = ProgressGauge::new();
        let bus = pipeline
            .bus()
            .ok_or_else(|| RunError::Fatal(MixcutError::render("pipeline has no bus")))?;

        // The pipeline runs faster than real time; the deadline only catches
        // a wedged pipeline, not a slow one.
        let deadline = Duration::from_secs_f64(span / rate * 4.0 + 30.0);
        let started = Instant::now();

        loop {
            if started.elapsed() > deadline {
                return Err(RunError::Fatal(MixcutError::render(
                    "export stalled; no EOS within the deadline",
                )));
            }
            match bus.timed_pop(gst::ClockTime::from_mseconds(100)) {
                Some(msg) => match msg.view() {
                    gst::MessageView::Eos(_) => {
                        debug!("export drained to EOS");
                        break;
                    }
                    gst::MessageView::Error(e) => {
                        return Err(RunError::Fatal(MixcutError::encode(format!(
                            "export pipeline error: {}",
                            e.error()
                        ))));
                    }
                    _ => {}
                },
                None => {
                    if let Some(position) = pipeline.query_position::<gst::ClockTime>() {
                        let secs = position.nseconds() as f64 / 1e9;
                        let pct = gauge.update(job.request.trim.fraction(secs));
                        report(progress, pct, secs, start, rate, job.fps, RenderStatus::Rendering);
                    }
                }
            }
        }

        let pct = gauge.finish();
        report(progress, pct, end, start, rate, job.fps, RenderStatus::Finalizing);
        Ok(job.output_path.clone())
    }
}

impl Default for GstExportBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportBackend for GstExportBackend {
    fn render(
        &mut self,
        job: &OfflineExportJob,
        progress: Option<ProgressCallback>,
    ) -> MixcutResult<PathBuf> {
        ensure_gst()?;

        let with_music = job.request.music.is_some();
        match self.run_once(job, with_music, &progress) {
            Ok(path) => Ok(path),
            // A preroll failure with music in the graph is the offline
            // analog of a music connection failure: drop the branch and
            // render without it. Failures mid-render stay fatal.
            Err(RunError::Preroll(error)) if with_music => {
                warn!(%error, "music branch failed to preroll; exporting without music");
                self.run_once(job, false, &progress)
                    .map_err(RunError::into_inner)
            }
            Err(error) => Err(error.into_inner()),
        }
    }

    fn is_available(&self) -> bool {
        ensure_gst().is_ok()
    }

    fn name(&self) -> &str {
        "gstreamer"
    }
}

enum RunError {
    /// Failure before the pipeline reached Paused.
    Preroll(MixcutError),
    /// Failure after playback started.
    Fatal(MixcutError),
}

impl RunError {
    fn into_inner(self) -> MixcutError {
        match self {
            RunError::Preroll(e) | RunError::Fatal(e) => e,
        }
    }
}

fn report(
    progress: &Option<ProgressCallback>,
    pct: f64,
    position_secs: f64,
    start: f64,
    rate: f64,
    fps: u32,
    stage: RenderStatus,
) {
    if let Some(callback) = progress {
        let elapsed_output = (position_secs - start).max(0.0) / rate;
        callback(RenderProgress {
            pct,
            frames_drawn: (elapsed_output * fps as f64) as u64,
            position_secs,
            stage,
        });
    }
}

fn ensure_gst() -> MixcutResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    match GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string())) {
        Ok(()) => Ok(()),
        Err(e) => Err(MixcutError::unsupported(format!(
            "gstreamer initialization failed: {e}"
        ))),
    }
}

/// Convert a decibel value to linear amplitude.
pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 20.0)
}

/// Video grade elements for the selected preset and upscale flag, in draw
/// order. Each entry is one launch-string element; empty means no grading.
///
/// The mapping tracks the interactive compositor's filter expressions:
/// saturate/contrast/brightness land on `videobalance` (brightness is an
/// offset there, so a 120% lift becomes +0.2), sepia tones come from
/// `coloreffects`, and hue rotation maps degrees onto videobalance's
/// [-1, 1] range where 1.0 is a half turn.
pub fn grade_elements(settings: &PlaybackSettings) -> Vec<String> {
    let mut elements: Vec<String> = Vec::new();
    match settings.visual_filter {
        VisualFilter::Original => {}
        VisualFilter::Grayscale => elements.push("videobalance saturation=0.0".to_string()),
        VisualFilter::Sepia => elements.push("coloreffects preset=sepia".to_string()),
        VisualFilter::HighContrast => elements.push("videobalance contrast=1.5".to_string()),
        VisualFilter::Brighten => elements.push("videobalance brightness=0.2".to_string()),
        VisualFilter::Vintage => {
            elements.push("coloreffects preset=sepia".to_string());
            elements.push("videobalance contrast=1.2 brightness=0.1 saturation=0.8".to_string());
        }
        VisualFilter::Cyberpunk => {
            elements.push("videobalance contrast=1.2 saturation=1.5 hue=0.056".to_string());
        }
    }
    if settings.hd_upscale {
        elements.push("videobalance contrast=1.15 saturation=1.1 brightness=0.05".to_string());
    }
    elements
}

/// Audio chain elements for a planned enhancement chain, in stage order.
///
/// `audiocheblimit` covers the high-pass stage directly. The presence boost
/// lands on the 3.77 kHz band of `equalizer-10bands`, the nearest fixed
/// band to the 3 kHz center. `audiodynamic` takes a linear threshold and an
/// inverted ratio and has no attack/release controls; soft-knee stands in
/// for the documented knee width.
pub fn audio_chain_elements(plan: &AudioChainPlan) -> Vec<String> {
    plan.stages
        .iter()
        .map(|stage| match *stage {
            AudioStage::Highpass { cutoff_hz } => {
                format!("audiocheblimit mode=high-pass cutoff={cutoff_hz} poles=4")
            }
            AudioStage::Peaking { gain_db, .. } => {
                format!("equalizer-10bands band7={gain_db}")
            }
            AudioStage::Compressor {
                threshold_db, ratio, ..
            } => format!(
                "audiodynamic mode=compressor characteristics=soft-knee threshold={:.4} ratio={:.4}",
                db_to_linear(threshold_db),
                1.0 / ratio
            ),
        })
        .collect()
}

/// Assemble the complete launch string for one export job.
///
/// Branch layout: decode the source once, grade and re-time the video into
/// VP9, run the source audio through the voice chain and its gain into an
/// `audiomixer`, optionally pull the music track into the same mixer, and
/// mux VP9 + Opus into WebM. `scaletempo` keeps audio pitch stable under
/// rate-adjusted seeks.
pub fn build_export_launch(job: &OfflineExportJob, with_music: bool) -> String {
    let settings = &job.request.settings;
    let source = escape_location(&job.request.source_path);
    let output = escape_location(&job.output_path);
    let fps = job.fps;

    let grade = join_fragment(&grade_elements(settings));
    let chain_plan = mixcut_processing_core::plan_voice_chain(settings.voice_clarity);
    let voice = join_fragment(&audio_chain_elements(&chain_plan));

    let mut parts: Vec<String> = Vec::new();
    parts.push(format!("webmmux name=mux ! filesink location=\"{output}\""));
    parts.push(format!("filesrc location=\"{source}\" ! decodebin name=dec"));
    parts.push(format!(
        "dec. ! queue ! videoconvert ! videorate ! video/x-raw,framerate={fps}/1 ! {grade}\
         vp9enc deadline=1 cpu-used=4 threads=4 ! queue ! mux."
    ));
    parts.push(
        "audiomixer name=mix ! audioconvert ! audioresample ! opusenc ! queue ! mux.".to_string(),
    );
    parts.push(format!(
        "dec. ! queue ! audioconvert ! audioresample ! scaletempo ! {voice}\
         volume volume={video_volume} ! mix.",
        video_volume = settings.video_volume
    ));
    if with_music {
        if let Some(track) = &job.request.music {
            parts.push(format!(
                "souphttpsrc name=musicsrc location=\"{url}\" ! decodebin ! queue ! \
                 audioconvert ! audioresample ! scaletempo ! volume volume={music_volume} ! mix.",
                url = track.url,
                music_volume = settings.music_volume
            ));
        }
    }
    parts.join(" ")
}

/// Join element fragments into an `elem ! elem ! ` run, empty when there
/// are no fragments so branches splice cleanly either way.
fn join_fragment(elements: &[String]) -> String {
    let mut out = String::new();
    for element in elements {
        out.push_str(element);
        out.push_str(" ! ");
    }
    out
}

fn escape_location(path: &Path) -> String {
    path.to_string_lossy().replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixcut_media_model::{
        builtin_catalog, PlaybackRate, PlaybackSettings, TrimRange, VisualFilter,
    };
    use mixcut_processing_core::plan_voice_chain;

    fn job(settings: PlaybackSettings, with_music: bool) -> OfflineExportJob {
        let mut trim = TrimRange::full(60.0);
        trim.set_bounds(2.0, 5.0);
        OfflineExportJob {
            request: RenderRequest {
                source_path: PathBuf::from("/videos/clip.mp4"),
                trim,
                settings,
                music: with_music.then(|| builtin_catalog()[0].clone()),
            },
            output_path: PathBuf::from("/tmp/out.webm"),
            fps: 30,
        }
    }

    #[test]
    fn test_original_preset_contributes_no_grade() {
        assert!(grade_elements(&PlaybackSettings::default()).is_empty());
    }

    #[test]
    fn test_upscale_appends_boost_after_preset() {
        let settings = PlaybackSettings {
            visual_filter: VisualFilter::Grayscale,
            hd_upscale: true,
            ..PlaybackSettings::default()
        };
        assert_eq!(
            grade_elements(&settings),
            vec![
                "videobalance saturation=0.0".to_string(),
                "videobalance contrast=1.15 saturation=1.1 brightness=0.05".to_string(),
            ]
        );
    }

    #[test]
    fn test_voice_chain_elements_in_stage_order() {
        let elements = audio_chain_elements(&plan_voice_chain(true));
        assert_eq!(elements.len(), 3);
        assert_eq!(
            elements[0],
            "audiocheblimit mode=high-pass cutoff=100 poles=4"
        );
        assert_eq!(elements[1], "equalizer-10bands band7=4");
        assert_eq!(
            elements[2],
            "audiodynamic mode=compressor characteristics=soft-knee threshold=0.0631 ratio=0.0833"
        );
    }

    #[test]
    fn test_disabled_voice_chain_is_structurally_absent() {
        assert!(audio_chain_elements(&plan_voice_chain(false)).is_empty());
    }

    #[test]
    fn test_db_to_linear() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
        assert!((db_to_linear(-24.0) - 0.0631).abs() < 1e-4);
    }

    #[test]
    fn test_launch_without_music_has_no_music_branch() {
        let launch = build_export_launch(&job(PlaybackSettings::default(), false), false);
        assert!(launch.contains("filesrc location=\"/videos/clip.mp4\""));
        assert!(launch.contains("vp9enc"));
        assert!(launch.contains("opusenc"));
        assert!(launch.contains("webmmux name=mux"));
        assert!(!launch.contains("souphttpsrc"));
    }

    #[test]
    fn test_launch_with_music_pulls_the_track_into_the_mixer() {
        let launch = build_export_launch(&job(PlaybackSettings::default(), true), true);
        assert!(launch.contains("souphttpsrc name=musicsrc"));
        assert!(launch.contains("soundhelix.com"));
        assert!(launch.contains("volume volume=0.4 ! mix."));
    }

    #[test]
    fn test_launch_music_suppressed_on_degraded_retry() {
        let launch = build_export_launch(&job(PlaybackSettings::default(), true), false);
        assert!(!launch.contains("souphttpsrc"));
    }

    #[test]
    fn test_launch_identity_grade_splices_cleanly() {
        let launch = build_export_launch(&job(PlaybackSettings::default(), false), false);
        assert!(launch.contains("framerate=30/1 ! vp9enc"));
        assert!(launch.contains("scaletempo ! volume volume=1"));
    }

    #[test]
    fn test_launch_carries_grade_and_voice_chain() {
        let settings = PlaybackSettings {
            visual_filter: VisualFilter::Vintage,
            voice_clarity: true,
            rate: PlaybackRate::Double,
            ..PlaybackSettings::default()
        };
        let launch = build_export_launch(&job(settings, false), false);
        assert!(launch.contains("coloreffects preset=sepia ! videobalance contrast=1.2"));
        assert!(launch.contains("audiocheblimit mode=high-pass"));
        assert!(launch.contains("equalizer-10bands"));
        assert!(launch.contains("audiodynamic mode=compressor"));
    }

    #[test]
    fn test_escape_location_quotes() {
        assert_eq!(
            escape_location(Path::new("/tmp/odd\"name.webm")),
            "/tmp/odd\\\"name.webm"
        );
    }
}
