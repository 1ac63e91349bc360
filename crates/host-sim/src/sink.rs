//! Simulated compositing surface and recorder.
//!
//! The sink records one `DrawRecord` per draw call instead of rasterizing;
//! the recorder turns the sink's draw count into an artifact. Artifact
//! duration is frames over capture rate, which is exactly what a real
//! encoder sees on its input pad.

use std::sync::Arc;

use mixcut_common::{MixcutError, MixcutResult};
use mixcut_host_core::{
    ArtifactLocation, FrameSink, MediaElement, RecorderArtifact, StreamHandle, StreamRecorder,
};
use parking_lot::Mutex;

use crate::ledger::{StreamRecord, StreamRegistry};

/// Container overhead plus per-frame payload for simulated artifact sizes.
const HEADER_BYTES: u64 = 256;
const FRAME_BYTES: u64 = 4096;

/// One composited frame.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    /// Source element position when the frame was drawn.
    pub position_secs: f64,
    /// Filter expression active for the draw.
    pub filter: String,
}

/// Mutable state of one frame sink, shared with the host ledger.
#[derive(Debug)]
pub struct SinkState {
    pub width: u32,
    pub height: u32,
    pub filter: String,
    pub draws: Vec<DrawRecord>,
    pub capture_fps: Option<u32>,
}

impl SinkState {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            filter: "none".to_string(),
            draws: Vec::new(),
            capture_fps: None,
        }
    }
}

/// Simulated compositing surface.
pub struct SimFrameSink {
    state: Arc<Mutex<SinkState>>,
    streams: Arc<Mutex<StreamRegistry>>,
}

impl SimFrameSink {
    pub(crate) fn new(
        state: Arc<Mutex<SinkState>>,
        streams: Arc<Mutex<StreamRegistry>>,
    ) -> Self {
        Self { state, streams }
    }
}

impl FrameSink for SimFrameSink {
    fn width(&self) -> u32 {
        self.state.lock().width
    }

    fn height(&self) -> u32 {
        self.state.lock().height
    }

    fn set_filter(&mut self, expression: &str) -> MixcutResult<()> {
        self.state.lock().filter = expression.to_string();
        Ok(())
    }

    fn draw_frame(&mut self, element: &dyn MediaElement) -> MixcutResult<()> {
        let position_secs = element.current_time();
        let mut state = self.state.lock();
        let filter = state.filter.clone();
        state.draws.push(DrawRecord {
            position_secs,
            filter,
        });
        Ok(())
    }

    fn capture_stream(&mut self, fps: u32) -> MixcutResult<StreamHandle> {
        if fps == 0 {
            return Err(MixcutError::encode("capture rate must be positive"));
        }
        self.state.lock().capture_fps = Some(fps);
        let handle = self.streams.lock().register(StreamRecord::SinkVideo {
            sink: Arc::clone(&self.state),
            fps,
        });
        Ok(handle)
    }

    fn frames_drawn(&self) -> u64 {
        self.state.lock().draws.len() as u64
    }
}

/// Mutable state of one recorder, shared with the host ledger.
#[derive(Debug)]
pub struct RecorderState {
    pub mime: String,
    pub started: bool,
    pub stopped: bool,
    pub discarded: bool,
    pub frames_at_start: u64,
    /// Fail the next `start` call.
    pub fail_start: bool,
    /// Fail the next `stop` call.
    pub fail_stop: bool,
}

impl RecorderState {
    pub(crate) fn new(mime: String) -> Self {
        Self {
            mime,
            started: false,
            stopped: false,
            discarded: false,
            frames_at_start: 0,
            fail_start: false,
            fail_stop: false,
        }
    }
}

/// Simulated encoder over a sink's captured stream.
pub struct SimRecorder {
    state: Arc<Mutex<RecorderState>>,
    video: Arc<Mutex<SinkState>>,
    fps: u32,
    mime: String,
}

impl SimRecorder {
    pub(crate) fn new(
        state: Arc<Mutex<RecorderState>>,
        video: Arc<Mutex<SinkState>>,
        fps: u32,
    ) -> Self {
        let mime = state.lock().mime.clone();
        Self {
            state,
            video,
            fps,
            mime,
        }
    }
}

impl StreamRecorder for SimRecorder {
    fn start(&mut self) -> MixcutResult<()> {
        let frames = self.video.lock().draws.len() as u64;
        let mut state = self.state.lock();
        if state.started {
            return Err(MixcutError::invalid_state("recorder already started"));
        }
        if state.fail_start {
            return Err(MixcutError::encode("encoder refused to start"));
        }
        state.started = true;
        state.frames_at_start = frames;
        Ok(())
    }

    fn stop(&mut self) -> MixcutResult<RecorderArtifact> {
        let frames_now = self.video.lock().draws.len() as u64;
        let mut state = self.state.lock();
        if !state.started {
            return Err(MixcutError::invalid_state("recorder never started"));
        }
        if state.stopped || state.discarded {
            return Err(MixcutError::invalid_state("recorder already finalized"));
        }
        if state.fail_stop {
            return Err(MixcutError::encode("encoder failed to finalize container"));
        }
        state.stopped = true;
        let frames = frames_now - state.frames_at_start;
        Ok(RecorderArtifact {
            frames,
            duration_secs: frames as f64 / self.fps as f64,
            mime: state.mime.clone(),
            location: ArtifactLocation::Memory {
                byte_size: HEADER_BYTES + frames * FRAME_BYTES,
            },
        })
    }

    fn discard(&mut self) -> MixcutResult<()> {
        let mut state = self.state.lock();
        if !state.started {
            return Err(MixcutError::invalid_state("recorder never started"));
        }
        if state.stopped || state.discarded {
            return Err(MixcutError::invalid_state("recorder already finalized"));
        }
        state.discarded = true;
        Ok(())
    }

    fn mime(&self) -> &str {
        &self.mime
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimClock;
    use crate::element::{ElementKind, ElementState, SimMediaElement};

    fn sink_and_registry() -> (SimFrameSink, Arc<Mutex<SinkState>>) {
        let state = Arc::new(Mutex::new(SinkState::new(1280, 720)));
        let sink = SimFrameSink::new(
            Arc::clone(&state),
            Arc::new(Mutex::new(StreamRegistry::default())),
        );
        (sink, state)
    }

    fn element_at(position: f64) -> SimMediaElement {
        let state = ElementState {
            kind: ElementKind::Video,
            label: "v.mp4".to_string(),
            duration_secs: 60.0,
            width: 1280,
            height: 720,
            polls_until_ready: 0,
            load_fails: false,
            anchor_media_secs: position,
            anchor_clock_ns: 0,
            playing: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            looping: false,
            play_count: 0,
            pause_count: 0,
            seek_count: 0,
        };
        SimMediaElement::new(SimClock::new(), Arc::new(Mutex::new(state)))
    }

    #[test]
    fn test_draws_record_position_and_filter() {
        let (mut sink, state) = sink_and_registry();
        sink.set_filter("sepia(60%)").unwrap();
        sink.draw_frame(&element_at(1.25)).unwrap();
        sink.draw_frame(&element_at(1.30)).unwrap();

        let s = state.lock();
        assert_eq!(s.draws.len(), 2);
        assert!((s.draws[0].position_secs - 1.25).abs() < 1e-9);
        assert_eq!(s.draws[1].filter, "sepia(60%)");
    }

    #[test]
    fn test_recorder_artifact_duration_is_frames_over_fps() {
        let (mut sink, sink_state) = sink_and_registry();
        let recorder_state = Arc::new(Mutex::new(RecorderState::new(
            "video/webm;codecs=vp9,opus".to_string(),
        )));
        let mut recorder = SimRecorder::new(recorder_state, Arc::clone(&sink_state), 30);

        recorder.start().unwrap();
        for _ in 0..90 {
            sink.draw_frame(&element_at(0.0)).unwrap();
        }
        let artifact = recorder.stop().unwrap();
        assert_eq!(artifact.frames, 90);
        assert!((artifact.duration_secs - 3.0).abs() < 1e-9);
        assert_eq!(
            artifact.location,
            ArtifactLocation::Memory {
                byte_size: HEADER_BYTES + 90 * FRAME_BYTES
            }
        );
    }

    #[test]
    fn test_recorder_counts_only_frames_after_start() {
        let (mut sink, sink_state) = sink_and_registry();
        for _ in 0..10 {
            sink.draw_frame(&element_at(0.0)).unwrap();
        }
        let recorder_state = Arc::new(Mutex::new(RecorderState::new("video/webm".to_string())));
        let mut recorder = SimRecorder::new(recorder_state, Arc::clone(&sink_state), 30);
        recorder.start().unwrap();
        for _ in 0..5 {
            sink.draw_frame(&element_at(0.0)).unwrap();
        }
        assert_eq!(recorder.stop().unwrap().frames, 5);
    }

    #[test]
    fn test_recorder_lifecycle_violations() {
        let (_sink, sink_state) = sink_and_registry();
        let recorder_state = Arc::new(Mutex::new(RecorderState::new("video/webm".to_string())));
        let mut recorder = SimRecorder::new(recorder_state, sink_state, 30);

        assert!(recorder.stop().is_err());
        recorder.start().unwrap();
        assert!(recorder.start().is_err());
        recorder.discard().unwrap();
        assert!(recorder.stop().is_err());
    }

    #[test]
    fn test_recorder_stop_fault() {
        let (_sink, sink_state) = sink_and_registry();
        let recorder_state = Arc::new(Mutex::new(RecorderState::new("video/webm".to_string())));
        recorder_state.lock().fail_stop = true;
        let mut recorder = SimRecorder::new(recorder_state, sink_state, 30);
        recorder.start().unwrap();
        assert!(recorder.stop().is_err());
    }

    #[test]
    fn test_zero_fps_capture_rejected() {
        let (mut sink, _state) = sink_and_registry();
        assert!(sink.capture_stream(0).is_err());
    }
}
