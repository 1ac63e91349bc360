//! Trim window over the source media.
//!
//! The trim range drives two different behaviors from one pair of bounds:
//! preview playback loops back to `start` when the position reaches `end`,
//! while an export run uses the same bounds to decide when to stop.

use serde::{Deserialize, Serialize};

/// Selected `[start, end)` sub-range of a source, in media seconds.
///
/// Invariant: `0 <= start < end <= duration`. Mutators constrain their
/// input so a bound can never cross its counterpart; an update that would
/// cross is dropped and the previous value kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    start: f64,
    end: f64,
    duration: f64,
}

impl TrimRange {
    /// Full-length range over a source of the given duration.
    pub fn full(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration,
            duration,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Move the start bound. Values at or past `end` are dropped.
    /// Returns whether the update was applied.
    pub fn set_start(&mut self, value: f64) -> bool {
        let value = value.clamp(0.0, self.duration);
        if value < self.end {
            self.start = value;
            true
        } else {
            false
        }
    }

    /// Move the end bound. Values at or below `start` are dropped.
    /// Returns whether the update was applied.
    pub fn set_end(&mut self, value: f64) -> bool {
        let value = value.clamp(0.0, self.duration);
        if value > self.start {
            self.end = value;
            true
        } else {
            false
        }
    }

    /// Replace both bounds at once. Applied only when the clamped pair
    /// still satisfies `start < end`; returns whether it was applied.
    pub fn set_bounds(&mut self, start: f64, end: f64) -> bool {
        let start = start.clamp(0.0, self.duration);
        let end = end.clamp(0.0, self.duration);
        if start < end {
            self.start = start;
            self.end = end;
            true
        } else {
            false
        }
    }

    /// Whether a position lies inside the window.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }

    /// Whether a position has reached the end of the window.
    ///
    /// Decoder granularity means a frame can land slightly past `end`, so
    /// this is a `>=` comparison, never an equality check.
    pub fn reached_end(&self, position: f64) -> bool {
        position >= self.end
    }

    /// Preview loop rule: where playback should jump when the position
    /// advances to or past `end`. `None` while still inside the window.
    pub fn loop_target(&self, position: f64) -> Option<f64> {
        if self.reached_end(position) {
            Some(self.start)
        } else {
            None
        }
    }

    /// Length of the window in media seconds.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Wall-clock seconds the window occupies at the given playback rate.
    pub fn effective_duration(&self, rate: f64) -> f64 {
        self.span() / rate
    }

    /// Fraction of the window covered at a position, clamped to `[0, 1]`.
    pub fn fraction(&self, position: f64) -> f64 {
        ((position - self.start) / self.span()).clamp(0.0, 1.0)
    }

    /// Whether the invariant holds (guards externally supplied data).
    pub fn is_valid(&self) -> bool {
        self.start >= 0.0
            && self.start < self.end
            && self.end <= self.duration
            && self.duration.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_range_covers_duration() {
        let range = TrimRange::full(60.0);
        assert_eq!(range.start(), 0.0);
        assert_eq!(range.end(), 60.0);
        assert!(range.is_valid());
    }

    #[test]
    fn test_start_cannot_cross_end() {
        let mut range = TrimRange::full(60.0);
        range.set_end(10.0);
        assert!(!range.set_start(10.0));
        assert!(!range.set_start(15.0));
        assert_eq!(range.start(), 0.0);
        assert!(range.set_start(9.9));
        assert_eq!(range.start(), 9.9);
    }

    #[test]
    fn test_end_cannot_cross_start() {
        let mut range = TrimRange::full(60.0);
        range.set_start(20.0);
        assert!(!range.set_end(20.0));
        assert!(!range.set_end(5.0));
        assert_eq!(range.end(), 60.0);
    }

    #[test]
    fn test_bounds_clamped_to_duration() {
        let mut range = TrimRange::full(60.0);
        range.set_start(-5.0);
        assert_eq!(range.start(), 0.0);
        range.set_end(120.0);
        assert_eq!(range.end(), 60.0);
    }

    #[test]
    fn test_set_bounds_rejects_inverted_pair() {
        let mut range = TrimRange::full(60.0);
        assert!(!range.set_bounds(30.0, 10.0));
        assert_eq!(range.start(), 0.0);
        assert_eq!(range.end(), 60.0);
        assert!(range.set_bounds(2.0, 5.0));
        assert_eq!(range.span(), 3.0);
    }

    #[test]
    fn test_loop_target_fires_at_end() {
        let mut range = TrimRange::full(60.0);
        range.set_bounds(2.0, 5.0);
        assert_eq!(range.loop_target(3.0), None);
        assert_eq!(range.loop_target(5.0), Some(2.0));
        assert_eq!(range.loop_target(5.03), Some(2.0));
    }

    #[test]
    fn test_effective_duration_scales_with_rate() {
        let mut range = TrimRange::full(60.0);
        range.set_bounds(2.0, 5.0);
        assert!((range.effective_duration(1.0) - 3.0).abs() < 1e-9);
        assert!((range.effective_duration(2.0) - 1.5).abs() < 1e-9);
        assert!((range.effective_duration(0.5) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_fraction_clamps_outside_window() {
        let mut range = TrimRange::full(60.0);
        range.set_bounds(2.0, 5.0);
        assert_eq!(range.fraction(1.0), 0.0);
        assert!((range.fraction(3.5) - 0.5).abs() < 1e-9);
        assert_eq!(range.fraction(7.0), 1.0);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Mutation {
        Start(f64),
        End(f64),
        Bounds(f64, f64),
    }

    fn mutation() -> impl Strategy<Value = Mutation> {
        prop_oneof![
            (-10.0..70.0f64).prop_map(Mutation::Start),
            (-10.0..70.0f64).prop_map(Mutation::End),
            ((-10.0..70.0f64), (-10.0..70.0f64)).prop_map(|(s, e)| Mutation::Bounds(s, e)),
        ]
    }

    proptest! {
        #[test]
        fn invariant_survives_any_mutation_sequence(
            muts in prop::collection::vec(mutation(), 0..64)
        ) {
            let mut range = TrimRange::full(60.0);
            for m in muts {
                match m {
                    Mutation::Start(v) => {
                        range.set_start(v);
                    }
                    Mutation::End(v) => {
                        range.set_end(v);
                    }
                    Mutation::Bounds(s, e) => {
                        range.set_bounds(s, e);
                    }
                }
                prop_assert!(range.is_valid());
            }
        }
    }
}
