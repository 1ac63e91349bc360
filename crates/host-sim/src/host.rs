//! Simulated host factory.

use std::path::Path;
use std::sync::Arc;

use mixcut_common::{MixcutError, MixcutResult};
use mixcut_host_core::{
    AudioGraph, FrameSink, MediaElement, MediaHost, RecorderConfig, StreamHandle, StreamRecorder,
};
use parking_lot::Mutex;
use tracing::debug;

use crate::clock::SimClock;
use crate::element::{ElementKind, ElementState, SimMediaElement};
use crate::graph::{GraphState, SimAudioGraph};
use crate::ledger::{LedgerInner, SimLedger, StreamRecord, StreamRegistry};
use crate::scheduler::SimScheduler;
use crate::sink::{RecorderState, SimFrameSink, SimRecorder, SinkState};

/// Failures the host injects into the resources it creates.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimFaults {
    /// Video elements finish loading in the failed state.
    pub video_load_fails: bool,
    /// Music elements finish loading in the failed state.
    pub music_load_fails: bool,
    /// Graphs reject `create_source` once this many sources exist.
    pub fail_source_after: Option<usize>,
    /// Recorders fail to start.
    pub recorder_start_fails: bool,
    /// Recorders fail to finalize on stop.
    pub recorder_stop_fails: bool,
}

/// Metadata and behavior of the media this host pretends to decode.
#[derive(Debug, Clone)]
pub struct SimHostConfig {
    pub video_duration_secs: f64,
    pub video_width: u32,
    pub video_height: u32,
    pub music_duration_secs: f64,
    /// Readiness polls an element answers `Loading` before settling.
    pub readiness_polls: u32,
    pub faults: SimFaults,
}

impl Default for SimHostConfig {
    fn default() -> Self {
        Self {
            video_duration_secs: 60.0,
            video_width: 1920,
            video_height: 1080,
            music_duration_secs: 240.0,
            readiness_polls: 0,
            faults: SimFaults::default(),
        }
    }
}

/// In-memory host. All resources share one synthetic clock and report into
/// one ledger.
pub struct SimHost {
    config: SimHostConfig,
    clock: SimClock,
    inner: Arc<Mutex<LedgerInner>>,
    streams: Arc<Mutex<StreamRegistry>>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::with_config(SimHostConfig::default())
    }

    pub fn with_config(config: SimHostConfig) -> Self {
        Self {
            config,
            clock: SimClock::new(),
            inner: Arc::new(Mutex::new(LedgerInner::default())),
            streams: Arc::new(Mutex::new(StreamRegistry::default())),
        }
    }

    /// The clock every resource of this host reads.
    pub fn clock(&self) -> SimClock {
        self.clock.clone()
    }

    /// Inspection handle that stays valid after resources move away.
    pub fn ledger(&self) -> SimLedger {
        SimLedger {
            inner: Arc::clone(&self.inner),
            clock: self.clock.clone(),
        }
    }

    /// Scheduler stepping this host's clock.
    pub fn scheduler(&self, target_hz: u32) -> SimScheduler {
        SimScheduler::new(self.clock.clone(), target_hz)
    }

    fn spawn_element(
        &mut self,
        kind: ElementKind,
        label: String,
        duration_secs: f64,
        width: u32,
        height: u32,
        load_fails: bool,
    ) -> SimMediaElement {
        let state = Arc::new(Mutex::new(ElementState {
            kind,
            label,
            duration_secs,
            width,
            height,
            polls_until_ready: self.config.readiness_polls,
            load_fails,
            anchor_media_secs: 0.0,
            anchor_clock_ns: self.clock.now_ns(),
            playing: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            looping: false,
            play_count: 0,
            pause_count: 0,
            seek_count: 0,
        }));
        self.inner.lock().elements.push(Arc::clone(&state));
        SimMediaElement::new(self.clock.clone(), state)
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaHost for SimHost {
    fn create_video_element(&mut self, path: &Path) -> MixcutResult<Box<dyn MediaElement>> {
        debug!(path = %path.display(), "sim: create video element");
        let element = self.spawn_element(
            ElementKind::Video,
            path.display().to_string(),
            self.config.video_duration_secs,
            self.config.video_width,
            self.config.video_height,
            self.config.faults.video_load_fails,
        );
        Ok(Box::new(element))
    }

    fn create_audio_element(&mut self, path: &Path) -> MixcutResult<Box<dyn MediaElement>> {
        debug!(path = %path.display(), "sim: create audio element");
        let element = self.spawn_element(
            ElementKind::Audio,
            path.display().to_string(),
            self.config.video_duration_secs,
            0,
            0,
            self.config.faults.video_load_fails,
        );
        Ok(Box::new(element))
    }

    fn create_music_element(&mut self, url: &str) -> MixcutResult<Box<dyn MediaElement>> {
        debug!(url, "sim: create music element");
        let element = self.spawn_element(
            ElementKind::Music,
            url.to_string(),
            self.config.music_duration_secs,
            0,
            0,
            self.config.faults.music_load_fails,
        );
        Ok(Box::new(element))
    }

    fn create_audio_graph(&mut self) -> MixcutResult<Box<dyn AudioGraph>> {
        let state = Arc::new(Mutex::new(GraphState {
            fail_source_after: self.config.faults.fail_source_after,
            ..GraphState::default()
        }));
        self.inner.lock().graphs.push(Arc::clone(&state));
        Ok(Box::new(SimAudioGraph::new(
            state,
            Arc::clone(&self.streams),
        )))
    }

    fn create_frame_sink(&mut self, width: u32, height: u32) -> MixcutResult<Box<dyn FrameSink>> {
        if width == 0 || height == 0 {
            return Err(MixcutError::render(format!(
                "frame sink needs non-zero dimensions, got {width}x{height}"
            )));
        }
        let state = Arc::new(Mutex::new(SinkState::new(width, height)));
        self.inner.lock().sinks.push(Arc::clone(&state));
        Ok(Box::new(SimFrameSink::new(
            state,
            Arc::clone(&self.streams),
        )))
    }

    fn create_recorder(
        &mut self,
        video: StreamHandle,
        audio: Option<StreamHandle>,
        config: RecorderConfig,
    ) -> MixcutResult<Box<dyn StreamRecorder>> {
        let streams = self.streams.lock();
        let (sink, fps) = match streams.get(video) {
            Some(StreamRecord::SinkVideo { sink, fps }) => (Arc::clone(sink), *fps),
            Some(StreamRecord::GraphAudio) => {
                return Err(MixcutError::encode(
                    "recorder video input is an audio stream",
                ))
            }
            None => {
                return Err(MixcutError::encode(format!(
                    "unknown video stream handle {}",
                    video.0
                )))
            }
        };
        if let Some(handle) = audio {
            match streams.get(handle) {
                Some(StreamRecord::GraphAudio) => {}
                Some(StreamRecord::SinkVideo { .. }) => {
                    return Err(MixcutError::encode(
                        "recorder audio input is a video stream",
                    ))
                }
                None => {
                    return Err(MixcutError::encode(format!(
                        "unknown audio stream handle {}",
                        handle.0
                    )))
                }
            }
        }
        drop(streams);

        let mut state = RecorderState::new(config.mime);
        state.fail_start = self.config.faults.recorder_start_fails;
        state.fail_stop = self.config.faults.recorder_stop_fails;
        let state = Arc::new(Mutex::new(state));
        self.inner.lock().recorders.push(Arc::clone(&state));
        Ok(Box::new(SimRecorder::new(state, sink, fps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_resources_land_in_ledger() {
        let mut host = SimHost::new();
        let ledger = host.ledger();

        let _video = host.create_video_element(Path::new("clip.mp4")).unwrap();
        let _audio = host.create_audio_element(Path::new("clip.mp4")).unwrap();
        let _music = host
            .create_music_element("https://music.example/track.mp3")
            .unwrap();
        let _graph = host.create_audio_graph().unwrap();
        let mut sink = host.create_frame_sink(1920, 1080).unwrap();
        let stream = sink.capture_stream(30).unwrap();
        let _recorder = host
            .create_recorder(stream, None, RecorderConfig::default())
            .unwrap();

        assert_eq!(ledger.elements().len(), 3);
        assert_eq!(ledger.elements_of(ElementKind::Music).len(), 1);
        assert_eq!(ledger.graphs().len(), 1);
        assert_eq!(ledger.sinks().len(), 1);
        assert_eq!(ledger.recorders().len(), 1);
    }

    #[test]
    fn test_elements_share_host_clock() {
        let mut host = SimHost::new();
        let clock = host.clock();
        let mut video = host.create_video_element(Path::new("clip.mp4")).unwrap();
        video.play().unwrap();
        clock.advance_secs(7.0);
        assert!((video.current_time() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_music_fault_applies_only_to_music() {
        let mut host = SimHost::with_config(SimHostConfig {
            faults: SimFaults {
                music_load_fails: true,
                ..SimFaults::default()
            },
            ..SimHostConfig::default()
        });
        let video = host.create_video_element(Path::new("clip.mp4")).unwrap();
        let music = host.create_music_element("https://m.example/t.mp3").unwrap();
        assert!(video.metadata().is_ok());
        assert!(music.metadata().is_err());
    }

    #[test]
    fn test_recorder_rejects_mismatched_streams() {
        let mut host = SimHost::new();
        let graph = host.create_audio_graph().unwrap();
        let audio_stream = graph.destination_stream().unwrap();
        let err = host.create_recorder(audio_stream, None, RecorderConfig::default());
        assert!(err.is_err());

        let mut sink = host.create_frame_sink(640, 360).unwrap();
        let video_stream = sink.capture_stream(30).unwrap();
        let err = host.create_recorder(
            video_stream,
            Some(StreamHandle(999)),
            RecorderConfig::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_zero_dimension_sink_rejected() {
        let mut host = SimHost::new();
        assert!(host.create_frame_sink(0, 720).is_err());
    }
}
