//! Simulated media element.
//!
//! Position is derived, never stored: the element keeps a media-time anchor
//! and the clock instant that anchor was taken at, and computes the current
//! position from the two. Play, pause, seek, and rate changes re-anchor.
//! Because the clock only moves when stepped, a paused sim run and a 2x run
//! land on exactly the positions the math says they should.

use std::sync::Arc;

use mixcut_common::{MixcutError, MixcutResult};
use mixcut_host_core::{MediaElement, MediaMetadata, ReadyState};
use parking_lot::Mutex;

use crate::clock::SimClock;

/// What a simulated element stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Offscreen video frame source.
    Video,
    /// Audio track of a local source.
    Audio,
    /// Remote background music track.
    Music,
}

/// Mutable state of one element, shared with the host ledger.
#[derive(Debug)]
pub struct ElementState {
    pub kind: ElementKind,
    /// Path or URL the element was created over.
    pub label: String,
    pub duration_secs: f64,
    pub width: u32,
    pub height: u32,

    /// Readiness polls left before the element reports `Ready` or `Failed`.
    pub polls_until_ready: u32,
    /// Report `Failed` instead of `Ready` once loading finishes.
    pub load_fails: bool,

    /// Media position at the last anchor point.
    pub anchor_media_secs: f64,
    /// Clock instant of the last anchor point.
    pub anchor_clock_ns: u64,

    pub playing: bool,
    pub rate: f64,
    pub volume: f64,
    pub muted: bool,
    pub looping: bool,

    pub play_count: u32,
    pub pause_count: u32,
    pub seek_count: u32,
}

impl ElementState {
    fn raw_position(&self, now_ns: u64) -> f64 {
        if !self.playing {
            return self.anchor_media_secs;
        }
        let elapsed = now_ns.saturating_sub(self.anchor_clock_ns) as f64 / 1_000_000_000.0;
        self.anchor_media_secs + elapsed * self.rate
    }

    /// Position with end-of-stream semantics applied: looping elements wrap,
    /// others clamp at the duration.
    pub fn position(&self, now_ns: u64) -> f64 {
        let raw = self.raw_position(now_ns);
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        if raw < self.duration_secs {
            return raw.max(0.0);
        }
        if self.looping {
            raw % self.duration_secs
        } else {
            self.duration_secs
        }
    }

    /// Whether the element sits at its natural end.
    pub fn at_end(&self, now_ns: u64) -> bool {
        !self.looping && self.duration_secs > 0.0 && self.raw_position(now_ns) >= self.duration_secs
    }

    fn loaded(&self) -> bool {
        self.polls_until_ready == 0
    }

    fn re_anchor(&mut self, now_ns: u64) {
        self.anchor_media_secs = self.position(now_ns);
        self.anchor_clock_ns = now_ns;
    }
}

/// Simulated playback handle. State lives behind a shared lock so the host
/// ledger can inspect it after the element has been moved into a pipeline.
pub struct SimMediaElement {
    clock: SimClock,
    state: Arc<Mutex<ElementState>>,
}

impl SimMediaElement {
    pub(crate) fn new(clock: SimClock, state: Arc<Mutex<ElementState>>) -> Self {
        Self { clock, state }
    }

    /// Shared state handle, used by the graph and ledger.
    pub(crate) fn state_handle(&self) -> Arc<Mutex<ElementState>> {
        Arc::clone(&self.state)
    }

    fn failed_error(&self) -> MixcutError {
        let state = self.state.lock();
        MixcutError::media(format!("source failed to load: {}", state.label))
    }
}

impl MediaElement for SimMediaElement {
    fn ready_state(&self) -> ReadyState {
        let mut state = self.state.lock();
        if state.polls_until_ready > 0 {
            state.polls_until_ready -= 1;
            return ReadyState::Loading;
        }
        if state.load_fails {
            ReadyState::Failed
        } else {
            ReadyState::Ready
        }
    }

    fn metadata(&self) -> MixcutResult<MediaMetadata> {
        let state = self.state.lock();
        if !state.loaded() {
            return Err(MixcutError::media(format!(
                "metadata not available yet: {}",
                state.label
            )));
        }
        if state.load_fails {
            drop(state);
            return Err(self.failed_error());
        }
        Ok(MediaMetadata {
            duration_secs: state.duration_secs,
            width: state.width,
            height: state.height,
        })
    }

    fn seek(&mut self, position_secs: f64) -> MixcutResult<()> {
        let now = self.clock.now_ns();
        let mut state = self.state.lock();
        let clamped = position_secs.clamp(0.0, state.duration_secs);
        state.anchor_media_secs = clamped;
        state.anchor_clock_ns = now;
        state.seek_count += 1;
        Ok(())
    }

    fn play(&mut self) -> MixcutResult<()> {
        let now = self.clock.now_ns();
        let mut state = self.state.lock();
        if state.load_fails && state.loaded() {
            drop(state);
            return Err(self.failed_error());
        }
        state.re_anchor(now);
        state.playing = true;
        state.play_count += 1;
        Ok(())
    }

    fn pause(&mut self) -> MixcutResult<()> {
        let now = self.clock.now_ns();
        let mut state = self.state.lock();
        state.re_anchor(now);
        state.playing = false;
        state.pause_count += 1;
        Ok(())
    }

    fn set_rate(&mut self, rate: f64) -> MixcutResult<()> {
        if rate <= 0.0 {
            return Err(MixcutError::media(format!(
                "playback rate must be positive, got {rate}"
            )));
        }
        let now = self.clock.now_ns();
        let mut state = self.state.lock();
        state.re_anchor(now);
        state.rate = rate;
        Ok(())
    }

    fn set_volume(&mut self, volume: f64) -> MixcutResult<()> {
        let mut state = self.state.lock();
        state.volume = volume.clamp(0.0, 1.0);
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> MixcutResult<()> {
        let now = self.clock.now_ns();
        let mut state = self.state.lock();
        // Re-anchor first so already-elapsed time keeps its old wrap rule.
        state.re_anchor(now);
        state.looping = looping;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> MixcutResult<()> {
        let mut state = self.state.lock();
        state.muted = muted;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        let now = self.clock.now_ns();
        self.state.lock().position(now)
    }

    fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn ended(&self) -> bool {
        let now = self.clock.now_ns();
        self.state.lock().at_end(now)
    }
}
