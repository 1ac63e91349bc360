//! The render pipeline state machine.
//!
//! One pipeline owns a media host and runs at most one render at a time:
//! `Idle -> Preparing -> Rendering -> Finalizing -> Done`, with error and
//! cancel exits from any non-terminal state back to `Idle`. The machine is
//! advanced by `tick`; a scheduler decides when ticks happen, so the same
//! code runs against wall-clock pacing in production and a stepped clock in
//! tests.
//!
//! The driving signal is the offscreen video's own playback position, not
//! elapsed wall time: frames are drawn in increasing source-time order and
//! the run stops when the position reaches the trim end or the source ends.
//! Teardown of everything built during Preparing runs exactly once, on the
//! success, cancel, and failure paths alike.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mixcut_common::{MixcutError, MixcutResult, SyncDrift};
use mixcut_host_core::{
    AudioGraph, FrameSink, MediaElement, MediaHost, ReadyState, RecorderArtifact, RecorderConfig,
    StreamRecorder, TickScheduler,
};
use mixcut_media_model::{MusicTrack, PlaybackSettings, TrimRange};
use mixcut_processing_core::{compose, MixPlan, ProgressGauge};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::artifact::RenderedExport;
use crate::graph::wire_mix_plan;

/// Capture rate of the compositing surface.
pub const DEFAULT_CAPTURE_FPS: u32 = 30;

/// Drift between the video and its audio element worth logging about.
const AUDIO_DRIFT_WARN_MS: f64 = 150.0;

/// Everything one render run needs to know.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub source_path: PathBuf,
    pub trim: TrimRange,
    pub settings: PlaybackSettings,
    pub music: Option<MusicTrack>,
}

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Idle,
    Preparing,
    Rendering,
    Finalizing,
    Done,
}

/// Progress report emitted once per tick while rendering.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    /// Percentage `[0, 100]`, non-decreasing within one run.
    pub pct: f64,
    /// Frames composited so far.
    pub frames_drawn: u64,
    /// Source position of the offscreen video in seconds.
    pub position_secs: f64,
    /// Stage the run is in.
    pub stage: RenderStatus,
}

/// Progress callback for render runs.
pub type ProgressCallback = Box<dyn Fn(RenderProgress) + Send>;

/// Shared cancellation flag for one render run.
///
/// Checked once per tick; cancellation takes effect within one frame
/// interval and routes through the same teardown as natural completion.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What one tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// The run continues; tick again.
    Working,
    /// The run is over; stop ticking.
    Finished(RenderOutcome),
}

/// How a run ended.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Finished with an artifact.
    Completed(RenderedExport),
    /// Cancelled by the user; no artifact, no error.
    Cancelled,
}

/// Host resources owned by the active run.
///
/// Everything is optional because resources accrete during Preparing and
/// drain during teardown; helpers treat a missing required resource as an
/// internal state error.
#[derive(Default)]
struct Resources {
    video: Option<Box<dyn MediaElement>>,
    audio: Option<Box<dyn MediaElement>>,
    music: Option<Box<dyn MediaElement>>,
    graph: Option<Box<dyn AudioGraph>>,
    sink: Option<Box<dyn FrameSink>>,
    recorder: Option<Box<dyn StreamRecorder>>,
    recorder_started: bool,
}

fn missing() -> MixcutError {
    MixcutError::invalid_state("render resources incomplete")
}

impl Resources {
    fn video_position(&self) -> MixcutResult<f64> {
        Ok(self.video.as_deref().ok_or_else(missing)?.current_time())
    }

    fn video_ended(&self) -> MixcutResult<bool> {
        Ok(self.video.as_deref().ok_or_else(missing)?.ended())
    }

    /// Lockstep drift between the frame source and its audio counterpart.
    fn audio_drift(&self) -> MixcutResult<SyncDrift> {
        Ok(SyncDrift {
            reference_s: self.video.as_deref().ok_or_else(missing)?.current_time(),
            measured_s: self.audio.as_deref().ok_or_else(missing)?.current_time(),
        })
    }

    fn frames_drawn(&self) -> u64 {
        self.sink.as_deref().map_or(0, |s| s.frames_drawn())
    }

    fn draw_current_frame(&mut self) -> MixcutResult<()> {
        let video = self.video.as_deref().ok_or_else(missing)?;
        let sink = self.sink.as_mut().ok_or_else(missing)?;
        sink.draw_frame(video)
    }

    fn pause_all(&mut self) {
        for element in [
            self.video.as_mut(),
            self.audio.as_mut(),
            self.music.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            if let Err(error) = element.pause() {
                warn!(%error, "element refused to pause during teardown");
            }
        }
    }

    fn finalize_recorder(&mut self, keep: bool) -> MixcutResult<Option<RecorderArtifact>> {
        let Some(mut recorder) = self.recorder.take() else {
            return Ok(None);
        };
        if !self.recorder_started {
            return Ok(None);
        }
        if keep {
            Ok(Some(recorder.stop()?))
        } else {
            if let Err(error) = recorder.discard() {
                warn!(%error, "recorder discard failed");
            }
            Ok(None)
        }
    }

    fn close_graph(&mut self) {
        if let Some(mut graph) = self.graph.take() {
            if let Err(error) = graph.close() {
                warn!(%error, "audio graph close failed");
            }
        }
    }

    fn release(&mut self) {
        self.video = None;
        self.audio = None;
        self.music = None;
        self.sink = None;
    }
}

struct RenderJob {
    request: RenderRequest,
    cancel: CancelHandle,
    gauge: ProgressGauge,
    progress: Option<ProgressCallback>,
    resources: Resources,
}

/// The render pipeline.
pub struct RenderPipeline {
    host: Box<dyn MediaHost>,
    fps: u32,
    status: RenderStatus,
    job: Option<RenderJob>,
}

impl RenderPipeline {
    pub fn new(host: Box<dyn MediaHost>) -> Self {
        Self::with_fps(host, DEFAULT_CAPTURE_FPS)
    }

    pub fn with_fps(host: Box<dyn MediaHost>, fps: u32) -> Self {
        Self {
            host,
            fps,
            status: RenderStatus::Idle,
            job: None,
        }
    }

    pub fn status(&self) -> RenderStatus {
        self.status
    }

    /// Whether a run is in flight.
    pub fn is_active(&self) -> bool {
        !matches!(self.status, RenderStatus::Idle | RenderStatus::Done)
    }

    /// Begin a render run.
    ///
    /// Only one run may be active per pipeline; starting while another run
    /// is in flight is an error. Returns the handle used to cancel the run
    /// from another thread.
    pub fn start(
        &mut self,
        request: RenderRequest,
        progress: Option<ProgressCallback>,
    ) -> MixcutResult<CancelHandle> {
        if self.status != RenderStatus::Idle {
            return Err(MixcutError::invalid_state(
                "a render is already active; cancel it or reset the pipeline first",
            ));
        }
        if !request.trim.is_valid() {
            return Err(MixcutError::render("trim range is empty or inverted"));
        }

        info!(
            source = %request.source_path.display(),
            rate = request.settings.rate.as_f64(),
            music = request.music.as_ref().map(|t| t.name.as_str()),
            "render: starting"
        );

        let mut resources = Resources::default();
        if let Err(error) = Self::create_elements(self.host.as_mut(), &request, &mut resources) {
            let _ = Self::run_teardown(&mut resources, false);
            return Err(error);
        }

        let cancel = CancelHandle::new();
        let job = RenderJob {
            request,
            cancel: cancel.clone(),
            gauge: ProgressGauge::new(),
            progress,
            resources,
        };
        Self::report(&job.progress, 0.0, 0, 0.0, RenderStatus::Preparing);
        self.job = Some(job);
        self.status = RenderStatus::Preparing;
        Ok(cancel)
    }

    /// Advance the run by one tick.
    ///
    /// Any error tears the run down and returns the pipeline to `Idle`; the
    /// error itself propagates to the caller for a single user-facing
    /// notice. No partial artifact survives a failure.
    pub fn tick(&mut self) -> MixcutResult<TickOutcome> {
        if self.job.is_none() {
            return Err(MixcutError::invalid_state("no active render"));
        }
        match self.try_tick() {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                error!(error = %err, "render failed; releasing resources");
                if let Some(mut job) = self.job.take() {
                    let _ = Self::run_teardown(&mut job.resources, false);
                }
                self.status = RenderStatus::Idle;
                Err(err)
            }
        }
    }

    /// Tick until the run finishes, pacing with `scheduler`.
    pub fn run_to_completion(
        &mut self,
        scheduler: &mut dyn TickScheduler,
    ) -> MixcutResult<RenderOutcome> {
        loop {
            scheduler.wait_tick();
            if let TickOutcome::Finished(outcome) = self.tick()? {
                return Ok(outcome);
            }
        }
    }

    /// Return to `Idle` after a completed run.
    pub fn reset(&mut self) -> MixcutResult<()> {
        if self.is_active() {
            return Err(MixcutError::invalid_state(
                "cannot reset while a render is active",
            ));
        }
        self.status = RenderStatus::Idle;
        self.job = None;
        Ok(())
    }

    fn try_tick(&mut self) -> MixcutResult<TickOutcome> {
        let job = self.job.as_mut().ok_or_else(missing)?;

        if job.cancel.is_cancelled() {
            info!("render cancelled; tearing down");
            self.status = RenderStatus::Finalizing;
            Self::run_teardown(&mut job.resources, false)?;
            self.status = RenderStatus::Idle;
            self.job = None;
            return Ok(TickOutcome::Finished(RenderOutcome::Cancelled));
        }

        match self.status {
            RenderStatus::Preparing => {
                if Self::elements_settled(&mut job.resources)? {
                    Self::complete_preparation(self.host.as_mut(), self.fps, job)?;
                    Self::begin_playback(job)?;
                    self.status = RenderStatus::Rendering;
                }
                Ok(TickOutcome::Working)
            }
            RenderStatus::Rendering => {
                let position = job.resources.video_position()?;
                if job.request.trim.reached_end(position) || job.resources.video_ended()? {
                    self.status = RenderStatus::Finalizing;
                    let pct = job.gauge.finish();
                    let frames = job.resources.frames_drawn();
                    Self::report(&job.progress, pct, frames, position, RenderStatus::Finalizing);

                    let artifact = Self::run_teardown(&mut job.resources, true)?
                        .ok_or_else(|| MixcutError::encode("recorder produced no artifact"))?;
                    let export = RenderedExport::wrap(artifact);
                    info!(
                        file = %export.file_name,
                        frames = export.artifact.frames,
                        duration_secs = export.artifact.duration_secs,
                        "render: complete"
                    );
                    self.status = RenderStatus::Done;
                    self.job = None;
                    return Ok(TickOutcome::Finished(RenderOutcome::Completed(export)));
                }

                let drift = job.resources.audio_drift()?;
                if drift.exceeds_threshold_ms(AUDIO_DRIFT_WARN_MS) {
                    warn!(drift_ms = drift.drift_ms(), "audio running out of lockstep with video");
                }

                job.resources.draw_current_frame()?;
                let pct = job.gauge.update(job.request.trim.fraction(position));
                let frames = job.resources.frames_drawn();
                Self::report(&job.progress, pct, frames, position, RenderStatus::Rendering);
                Ok(TickOutcome::Working)
            }
            RenderStatus::Idle | RenderStatus::Finalizing | RenderStatus::Done => Err(
                MixcutError::invalid_state("render pipeline ticked outside an active run"),
            ),
        }
    }

    fn create_elements(
        host: &mut dyn MediaHost,
        request: &RenderRequest,
        resources: &mut Resources,
    ) -> MixcutResult<()> {
        let mut video = host.create_video_element(&request.source_path)?;
        // The offscreen video is silent; its audio reaches the mix through
        // the dedicated audio element's source node.
        video.set_muted(true)?;
        resources.video = Some(video);
        resources.audio = Some(host.create_audio_element(&request.source_path)?);

        if let Some(track) = &request.music {
            match host.create_music_element(&track.url) {
                Ok(element) => resources.music = Some(element),
                Err(error) => {
                    warn!(%error, track = %track.name, "music element unavailable; rendering without music");
                }
            }
        }
        Ok(())
    }

    /// Poll element readiness. Video and audio must load or the render
    /// fails; music settles either way, degrading to no-music on failure.
    fn elements_settled(resources: &mut Resources) -> MixcutResult<bool> {
        fn required_ready(
            element: Option<&dyn MediaElement>,
            what: &str,
        ) -> MixcutResult<bool> {
            match element.ok_or_else(missing)?.ready_state() {
                ReadyState::Ready => Ok(true),
                ReadyState::Loading => Ok(false),
                ReadyState::Failed => Err(MixcutError::media(format!(
                    "offscreen {what} element cannot decode this source"
                ))),
            }
        }

        let video_ready = required_ready(resources.video.as_deref(), "video")?;
        let audio_ready = required_ready(resources.audio.as_deref(), "audio")?;
        let music_settled = match resources.music.as_deref().map(|m| m.ready_state()) {
            None | Some(ReadyState::Ready) => true,
            Some(ReadyState::Loading) => false,
            Some(ReadyState::Failed) => {
                warn!("music track failed to load; rendering without music");
                resources.music = None;
                true
            }
        };
        Ok(video_ready && audio_ready && music_settled)
    }

    /// All elements are ready: size the canvas to native dimensions, build
    /// and fully wire the audio graph, then open the recorder over the
    /// captured streams. Playback has not started yet.
    fn complete_preparation(
        host: &mut dyn MediaHost,
        fps: u32,
        job: &mut RenderJob,
    ) -> MixcutResult<()> {
        let resources = &mut job.resources;
        let metadata = resources.video.as_deref().ok_or_else(missing)?.metadata()?;
        if metadata.width == 0 || metadata.height == 0 {
            return Err(MixcutError::media("source reports no video dimensions"));
        }
        debug!(
            width = metadata.width,
            height = metadata.height,
            "render: canvas sized to source dimensions"
        );

        let mut sink = host.create_frame_sink(metadata.width, metadata.height)?;
        let expression = compose(
            job.request.settings.visual_filter,
            job.request.settings.hd_upscale,
        );
        sink.set_filter(&expression)?;

        let mut graph = host.create_audio_graph()?;
        let plan = MixPlan::from_settings(&job.request.settings, resources.music.is_some());
        let music_connected = wire_mix_plan(
            graph.as_mut(),
            &plan,
            resources.audio.as_deref().ok_or_else(missing)?,
            resources.music.as_deref(),
        )?;
        if !music_connected {
            resources.music = None;
        }

        let audio_stream = graph.destination_stream()?;
        let video_stream = sink.capture_stream(fps)?;
        let recorder = host.create_recorder(video_stream, Some(audio_stream), RecorderConfig::default())?;

        resources.sink = Some(sink);
        resources.graph = Some(graph);
        resources.recorder = Some(recorder);
        Ok(())
    }

    /// Seek everything into place, then start the encoder and playback.
    fn begin_playback(job: &mut RenderJob) -> MixcutResult<()> {
        let rate = job.request.settings.rate.as_f64();
        let start = job.request.trim.start();
        let resources = &mut job.resources;

        let video = resources.video.as_mut().ok_or_else(missing)?;
        video.seek(start)?;
        video.set_rate(rate)?;
        let audio = resources.audio.as_mut().ok_or_else(missing)?;
        audio.seek(start)?;
        audio.set_rate(rate)?;
        if let Some(music) = resources.music.as_mut() {
            // Music is not trimmed to the source window; it starts at its
            // own beginning and loops for the duration of the run.
            music.seek(0.0)?;
            music.set_rate(rate)?;
            music.set_looping(true)?;
        }

        resources.recorder.as_mut().ok_or_else(missing)?.start()?;
        resources.recorder_started = true;

        resources.video.as_mut().ok_or_else(missing)?.play()?;
        resources.audio.as_mut().ok_or_else(missing)?.play()?;
        if let Some(music) = resources.music.as_mut() {
            if let Err(error) = music.play() {
                warn!(%error, "music failed to start; mix continues without it");
            }
        }
        info!(rate, start_secs = start, "render: playback started");
        Ok(())
    }

    /// The one teardown sequence: pause every element, settle the recorder,
    /// close the graph, drop everything. Runs identically on success,
    /// cancel, and failure; `keep` decides whether the recording survives.
    fn run_teardown(
        resources: &mut Resources,
        keep: bool,
    ) -> MixcutResult<Option<RecorderArtifact>> {
        resources.pause_all();
        let result = resources.finalize_recorder(keep);
        resources.close_graph();
        resources.release();
        result
    }

    fn report(
        progress: &Option<ProgressCallback>,
        pct: f64,
        frames_drawn: u64,
        position_secs: f64,
        stage: RenderStatus,
    ) {
        if let Some(callback) = progress {
            callback(RenderProgress {
                pct,
                frames_drawn,
                position_secs,
                stage,
            });
        }
    }
}
