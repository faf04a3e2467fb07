//! Time management.
//!
//! Two budgets are kept per search: an ideal time the search would like
//! to spend and a hard maximum it must never exceed. The ideal budget is
//! stretched while the score is dropping or the best move keeps changing
//! and shrunk while everything is stable.

use std::time::Instant;

use crate::board::types::Value;

use super::SearchLimits;

/// Milliseconds elapsed since `start`.
#[inline]
#[must_use]
pub fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TimeManager {
    ideal: f64,
    max: f64,
    active: bool,
}

impl TimeManager {
    /// Derive the budgets from the limits of a `go` command.
    #[must_use]
    pub fn new(limits: &SearchLimits, move_overhead: u64) -> Self {
        let (ideal, max) = if limits.move_time > 0 {
            (limits.move_time as f64, limits.move_time as f64)
        } else if limits.time > 0 {
            let base = (limits.time + 25 * limits.increment) as f64 / 50.0;
            (base, 5.0 * base)
        } else {
            return TimeManager {
                ideal: 0.0,
                max: 0.0,
                active: false,
            };
        };

        TimeManager {
            ideal: (ideal - move_overhead as f64).max(1.0),
            max: (max - move_overhead as f64).max(1.0),
            active: true,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Called after each completed iteration with the scores of the last
    /// two iterations. A falling score buys extra thinking time, a
    /// sharply rising one a little as well.
    pub fn update(&mut self, value: Value, last_value: Value) {
        if last_value > value + 10 {
            self.ideal *= 1.025;
        }
        if last_value > value + 20 {
            self.ideal *= 1.025;
        }
        if last_value > value + 40 {
            self.ideal *= 1.025;
        }
        if last_value + 15 < value {
            self.ideal *= 1.015;
        }
        if last_value + 30 < value {
            self.ideal *= 1.025;
        }
    }

    /// Hard limit check, polled inside the search.
    #[must_use]
    pub fn is_exceeded(&self, elapsed: u64) -> bool {
        self.active && elapsed as f64 >= self.max
    }

    /// Between iterations: stop once the stability-scaled ideal budget
    /// (capped at the maximum) is spent.
    #[must_use]
    pub fn should_stop(&self, elapsed: u64, pv_stability: i32) -> bool {
        if !self.active {
            return false;
        }
        let ideal = self.ideal * (1.0 + f64::from(pv_stability) * 0.05);
        elapsed as f64 >= ideal.min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits_with_time(time: u64, increment: u64) -> SearchLimits {
        SearchLimits {
            time,
            increment,
            ..SearchLimits::default()
        }
    }

    #[test]
    fn test_movetime_sets_both_budgets() {
        let limits = SearchLimits {
            move_time: 2000,
            ..SearchLimits::default()
        };
        let tm = TimeManager::new(&limits, 100);
        assert!(tm.is_active());
        assert!(tm.is_exceeded(1901));
        assert!(!tm.is_exceeded(1800));
    }

    #[test]
    fn test_clock_allocation() {
        // 50s + nothing: ideal 1s, max 5s (before overhead).
        let tm = TimeManager::new(&limits_with_time(50_000, 0), 0);
        assert!(!tm.is_exceeded(4999));
        assert!(tm.is_exceeded(5000));
        assert!(tm.should_stop(1000, 0));
        assert!(!tm.should_stop(999, 0));
    }

    #[test]
    fn test_unstable_pv_extends_budget() {
        let tm = TimeManager::new(&limits_with_time(50_000, 0), 0);
        // With max stability ticks the ideal budget stretches by 40%.
        assert!(!tm.should_stop(1300, 8));
        assert!(tm.should_stop(1400, 8));
    }

    #[test]
    fn test_no_limits_means_inactive() {
        let tm = TimeManager::new(&SearchLimits::default(), 100);
        assert!(!tm.is_active());
        assert!(!tm.is_exceeded(u64::MAX / 2));
        assert!(!tm.should_stop(u64::MAX / 2, 0));
    }

    #[test]
    fn test_falling_score_buys_time() {
        let mut tm = TimeManager::new(&limits_with_time(50_000, 0), 0);
        let before = tm.should_stop(1049, 0);
        tm.update(-100, 0);
        // All three drop thresholds fired: ideal grew by ~7.7%.
        assert!(!tm.should_stop(1049, 0));
        assert!(before);
    }
}
