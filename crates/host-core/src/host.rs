//! Host factory.

use std::path::Path;

use mixcut_common::MixcutResult;

use crate::capture::{FrameSink, RecorderConfig, StreamHandle, StreamRecorder};
use crate::element::MediaElement;
use crate::graph::AudioGraph;

/// Factory for every host resource a render or playback session needs.
///
/// A host hands out independent elements: asking twice for the same path
/// yields two decoders with separate positions. All resources created by one
/// host share its clock.
pub trait MediaHost: Send {
    /// Decode handle over a local video file.
    fn create_video_element(&mut self, path: &Path) -> MixcutResult<Box<dyn MediaElement>>;

    /// Decode handle over the audio track of a local file.
    fn create_audio_element(&mut self, path: &Path) -> MixcutResult<Box<dyn MediaElement>>;

    /// Decode handle over a remote music track.
    fn create_music_element(&mut self, url: &str) -> MixcutResult<Box<dyn MediaElement>>;

    /// Fresh audio mixing session.
    fn create_audio_graph(&mut self) -> MixcutResult<Box<dyn AudioGraph>>;

    /// Compositing surface at the given native dimensions.
    fn create_frame_sink(&mut self, width: u32, height: u32) -> MixcutResult<Box<dyn FrameSink>>;

    /// Recorder over a video stream and an optional mixed audio stream.
    fn create_recorder(
        &mut self,
        video: StreamHandle,
        audio: Option<StreamHandle>,
        config: RecorderConfig,
    ) -> MixcutResult<Box<dyn StreamRecorder>>;
}
