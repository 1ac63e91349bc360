//! Synthetic clock shared by every simulated resource.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic synthetic clock. Time moves only when `advance` is called.
///
/// Clones share the same underlying counter, so a host, its elements, and a
/// scheduler all observe the same instant.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    now_ns: Arc<AtomicU64>,
}

impl SimClock {
    /// Clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current synthetic time in nanoseconds.
    pub fn now_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    /// Current synthetic time in seconds.
    pub fn now_secs(&self) -> f64 {
        self.now_ns() as f64 / 1_000_000_000.0
    }

    /// Step time forward. Returns the new now.
    pub fn advance(&self, delta_ns: u64) -> u64 {
        self.now_ns.fetch_add(delta_ns, Ordering::SeqCst) + delta_ns
    }

    /// Step time forward by a seconds value.
    pub fn advance_secs(&self, delta_secs: f64) -> u64 {
        self.advance((delta_secs * 1_000_000_000.0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ns(), 0);
    }

    #[test]
    fn test_advance_is_shared_across_clones() {
        let clock = SimClock::new();
        let other = clock.clone();
        clock.advance(500);
        assert_eq!(other.now_ns(), 500);
    }

    #[test]
    fn test_advance_secs() {
        let clock = SimClock::new();
        clock.advance_secs(1.5);
        assert!((clock.now_secs() - 1.5).abs() < 1e-9);
    }
}
