//! Media element contract.
//!
//! A media element is a decode/playback handle over one source: the host
//! decodes on its own threads and the element only reports position and
//! readiness. Offscreen render elements and visible preview elements are
//! distinct instances over the same source, never shared.

use mixcut_common::MixcutResult;
use serde::{Deserialize, Serialize};

/// Decode readiness of a media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    /// Metadata not available yet.
    Loading,
    /// Metadata available; duration and dimensions are valid.
    Ready,
    /// The source cannot be decoded.
    Failed,
}

/// Intrinsic properties of a loaded source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Intrinsic duration in seconds.
    pub duration_secs: f64,
    /// Native pixel width (0 for audio-only elements).
    pub width: u32,
    /// Native pixel height (0 for audio-only elements).
    pub height: u32,
}

/// Playback handle over one media source.
///
/// Position and duration are media time in seconds. `current_time` keeps
/// advancing on the host's clock while playing; callers poll it, they are
/// never called back.
pub trait MediaElement: Send {
    /// Decode readiness. Metadata accessors are valid once `Ready`.
    fn ready_state(&self) -> ReadyState;

    /// Intrinsic metadata. Errors until `ready_state` is `Ready`.
    fn metadata(&self) -> MixcutResult<MediaMetadata>;

    /// Seek to a media position.
    fn seek(&mut self, position_secs: f64) -> MixcutResult<()>;

    /// Begin playback from the current position.
    fn play(&mut self) -> MixcutResult<()>;

    /// Pause playback, keeping the current position.
    fn pause(&mut self) -> MixcutResult<()>;

    /// Set the playback rate.
    fn set_rate(&mut self, rate: f64) -> MixcutResult<()>;

    /// Set the element's own output volume `[0, 1]`.
    fn set_volume(&mut self, volume: f64) -> MixcutResult<()>;

    /// Whether playback wraps to the start at end of stream.
    fn set_looping(&mut self, looping: bool) -> MixcutResult<()>;

    /// Mute or unmute the element's direct output. A muted element still
    /// decodes and advances; its audio is only reachable through a graph
    /// source node.
    fn set_muted(&mut self, muted: bool) -> MixcutResult<()>;

    /// Current media position in seconds.
    fn current_time(&self) -> f64;

    /// Current playback rate.
    fn rate(&self) -> f64;

    /// Whether the element is currently playing.
    fn is_playing(&self) -> bool;

    /// Whether playback hit the natural end of the stream.
    fn ended(&self) -> bool;
}
