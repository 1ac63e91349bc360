//! Interactive preview playback.
//!
//! The coordinator keeps the visible video element and an optional music
//! element in step: shared rate, coordinated play/pause, loop-within-trim.
//! It owns nothing the render pipeline touches; a render run builds its own
//! offscreen elements over the same source.

pub mod coordinator;

pub use coordinator::{wait_until_ready, PlaybackCoordinator};
