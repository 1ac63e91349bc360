//! Frame compositing and stream capture contracts.

use std::path::PathBuf;

use mixcut_common::MixcutResult;
use serde::{Deserialize, Serialize};

use crate::element::MediaElement;

/// Opaque handle to a capturable media stream.
///
/// Streams come in two flavors: the frame sink's captured video track and an
/// audio graph's mixed destination. A recorder consumes one or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub u64);

/// Compositing surface sized to the source video's native dimensions.
///
/// Each tick the render loop draws the video element's current frame with the
/// active filter expression applied. Dimensions are fixed at creation; a new
/// source gets a new sink.
pub trait FrameSink: Send {
    /// Surface width in pixels.
    fn width(&self) -> u32;

    /// Surface height in pixels.
    fn height(&self) -> u32;

    /// Set the filter expression applied to subsequent draws.
    ///
    /// The expression is the composed grade string, `"none"` for identity.
    fn set_filter(&mut self, expression: &str) -> MixcutResult<()>;

    /// Draw the element's current frame onto the surface.
    fn draw_frame(&mut self, element: &dyn MediaElement) -> MixcutResult<()>;

    /// Expose the surface as a video stream at the given frame rate.
    fn capture_stream(&mut self, fps: u32) -> MixcutResult<StreamHandle>;

    /// Total frames drawn since creation.
    fn frames_drawn(&self) -> u64;
}

/// Encoder settings for a recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Container MIME type, e.g. `video/webm;codecs=vp9,opus`.
    pub mime: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            mime: "video/webm;codecs=vp9,opus".to_string(),
        }
    }
}

/// Where a finished recording's bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactLocation {
    /// Buffered in memory.
    Memory { byte_size: u64 },
    /// Written to a file.
    File { path: PathBuf },
}

/// A finished recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecorderArtifact {
    /// Video frames the recording contains.
    pub frames: u64,
    /// Recorded duration in seconds.
    pub duration_secs: f64,
    /// Container MIME type of the artifact.
    pub mime: String,
    /// Where the encoded bytes ended up.
    pub location: ArtifactLocation,
}

/// Encodes captured streams into a container.
///
/// `start` then exactly one of `stop` or `discard`. Stopping a recorder that
/// never started is an error.
pub trait StreamRecorder: Send {
    /// Begin encoding the streams the recorder was created over.
    fn start(&mut self) -> MixcutResult<()>;

    /// Stop encoding and finalize the container.
    fn stop(&mut self) -> MixcutResult<RecorderArtifact>;

    /// Stop encoding and drop everything recorded so far.
    fn discard(&mut self) -> MixcutResult<()>;

    /// Container MIME type this recorder produces.
    fn mime(&self) -> &str;
}
