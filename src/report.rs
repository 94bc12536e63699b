use std::fmt;

use crate::sampler::TickSnapshot;

/// Busy share of all CPU ticks elapsed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilizationReport {
    pub busy_percent: f64,
    pub busy_ticks: f64,
    pub total_ticks: f64,
}

impl UtilizationReport {
    /// Compute the report for the window `before..after`.
    ///
    /// Deltas use wrapping subtraction, so a counter that went backwards shows
    /// up as an absurd value rather than a panic. A zero total delta gives a
    /// non-finite `busy_percent`.
    pub fn between(before: TickSnapshot, after: TickSnapshot) -> Self {
        let idle_ticks = after.idle.wrapping_sub(before.idle) as f64;
        let total_ticks = after.total.wrapping_sub(before.total) as f64;
        let busy_ticks = total_ticks - idle_ticks;

        Self {
            busy_percent: 100.0 * busy_ticks / total_ticks,
            busy_ticks,
            total_ticks,
        }
    }

    /// False when no ticks elapsed and the percentage is NaN or infinite.
    pub fn is_measurable(&self) -> bool {
        self.busy_percent.is_finite()
    }
}

impl fmt::Display for UtilizationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CPU usage is {:.6}% [busy: {:.6}, total: {:.6}]",
            self.busy_percent, self.busy_ticks, self.total_ticks
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(idle: u64, total: u64) -> TickSnapshot {
        TickSnapshot { idle, total }
    }

    #[test]
    fn computes_busy_share() {
        let report = UtilizationReport::between(snap(200, 350), snap(250, 550));
        assert_eq!(report.total_ticks, 200.0);
        assert_eq!(report.busy_ticks, 150.0);
        assert_eq!(report.busy_percent, 75.0);
        assert!(report.is_measurable());
    }

    #[test]
    fn advancing_counters_stay_in_range() {
        let cases = [
            (snap(0, 0), snap(0, 1)),
            (snap(0, 0), snap(1, 1)),
            (snap(10, 100), snap(10, 200)),
            (snap(10, 100), snap(110, 200)),
            (snap(u64::MAX - 5, u64::MAX - 5), snap(u64::MAX - 2, u64::MAX)),
            (snap(1_234, 9_876), snap(5_000, 100_000)),
        ];
        for (before, after) in cases {
            let report = UtilizationReport::between(before, after);
            assert!(
                (0.0..=100.0).contains(&report.busy_percent),
                "{before:?} -> {after:?} gave {report}"
            );
        }
    }

    #[test]
    fn zero_total_is_unmeasurable() {
        let report = UtilizationReport::between(snap(40, 100), snap(40, 100));
        assert!(report.busy_percent.is_nan());
        assert!(!report.is_measurable());
        assert_eq!(report.to_string(), "CPU usage is NaN% [busy: 0.000000, total: 0.000000]");
    }

    #[test]
    fn zero_snapshots_are_unmeasurable() {
        let report = UtilizationReport::between(TickSnapshot::default(), TickSnapshot::default());
        assert!(!report.is_measurable());
    }

    #[test]
    fn idle_only_growth_is_infinite_not_a_panic() {
        // idle advanced while total did not: busy = -5 over 0 ticks
        let report = UtilizationReport::between(snap(0, 100), snap(5, 100));
        assert_eq!(report.busy_percent, f64::NEG_INFINITY);
        assert!(!report.is_measurable());
    }

    #[test]
    fn regressed_counter_does_not_panic() {
        let report = UtilizationReport::between(snap(100, 1_000), snap(50, 500));
        assert!(report.total_ticks > 1e18);
    }
}
