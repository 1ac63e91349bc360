//! Tick scheduling.
//!
//! The render loop never watches the clock itself: a scheduler blocks until
//! the next tick and hands back the tick's timestamp. Production uses a
//! wall-clock scheduler; tests substitute a synthetic one and step time
//! deterministically.

use std::thread;
use std::time::Duration;

use mixcut_common::{RateController, RenderClock};

/// Blocks the render loop between ticks.
pub trait TickScheduler: Send {
    /// Wait for the next tick. Returns nanoseconds elapsed since the
    /// scheduler's epoch, monotonic across calls.
    fn wait_tick(&mut self) -> u64;

    /// Tick interval in seconds.
    fn interval_secs(&self) -> f64;
}

/// Wall-clock scheduler pacing the loop to a fixed Hz rate.
pub struct WallClockScheduler {
    clock: RenderClock,
    controller: RateController,
}

impl WallClockScheduler {
    /// Create a scheduler anchored to now, targeting the given rate.
    pub fn start(target_hz: u32) -> Self {
        Self {
            clock: RenderClock::start(),
            controller: RateController::new(target_hz),
        }
    }
}

impl TickScheduler for WallClockScheduler {
    fn wait_tick(&mut self) -> u64 {
        loop {
            let now = self.clock.elapsed_ns();
            if self.controller.should_tick(now) {
                return now;
            }
            // Sleep a fraction of the interval so a late wakeup overshoots
            // the deadline by little.
            thread::sleep(Duration::from_nanos(self.controller.interval_ns() / 4));
        }
    }

    fn interval_secs(&self) -> f64 {
        self.controller.interval_secs()
    }
}
