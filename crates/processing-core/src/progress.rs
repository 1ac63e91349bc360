//! Progress accounting for a render run.

/// Clamped, monotonic progress percentage.
///
/// Positions can jitter backwards by a frame when the decoder snaps to a
/// keyframe after a seek; the gauge absorbs that so reported progress
/// never decreases within one run.
#[derive(Debug, Clone, Default)]
pub struct ProgressGauge {
    last_pct: f64,
}

impl ProgressGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a completion fraction `[0, 1]`, returning the percentage
    /// to report.
    pub fn update(&mut self, fraction: f64) -> f64 {
        let pct = (fraction * 100.0).clamp(0.0, 100.0);
        if pct > self.last_pct {
            self.last_pct = pct;
        }
        self.last_pct
    }

    /// Force completion (successful finalize).
    pub fn finish(&mut self) -> f64 {
        self.last_pct = 100.0;
        self.last_pct
    }

    /// Last reported percentage.
    pub fn value(&self) -> f64 {
        self.last_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_starts_at_zero() {
        assert_eq!(ProgressGauge::new().value(), 0.0);
    }

    #[test]
    fn test_gauge_never_decreases() {
        let mut gauge = ProgressGauge::new();
        assert_eq!(gauge.update(0.40), 40.0);
        assert_eq!(gauge.update(0.38), 40.0);
        assert_eq!(gauge.update(0.55), 55.0);
    }

    #[test]
    fn test_gauge_clamps_out_of_range_fractions() {
        let mut gauge = ProgressGauge::new();
        assert_eq!(gauge.update(-0.5), 0.0);
        assert_eq!(gauge.update(1.5), 100.0);
    }

    #[test]
    fn test_finish_reports_complete() {
        let mut gauge = ProgressGauge::new();
        gauge.update(0.7);
        assert_eq!(gauge.finish(), 100.0);
        assert_eq!(gauge.value(), 100.0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reported_value_is_monotonic_and_bounded(
                fractions in prop::collection::vec(-1.0..2.0f64, 0..128)
            ) {
                let mut gauge = ProgressGauge::new();
                let mut last = 0.0;
                for fraction in fractions {
                    let pct = gauge.update(fraction);
                    prop_assert!(pct >= last);
                    prop_assert!((0.0..=100.0).contains(&pct));
                    last = pct;
                }
            }
        }
    }
}
