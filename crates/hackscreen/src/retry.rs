#![forbid(unsafe_code)]

//! Cosmetic failure budget.
//!
//! Some phase steps are allowed to "fail" for dramatic effect before they
//! succeed. [`RetryTracker`] decides when such a failure is actually shown:
//! at most [`PER_PHASE_LIMIT`] times per phase and [`GLOBAL_LIMIT`] times per
//! run. Once either budget is spent every further draw is a forced success,
//! so a step that retries on failure always terminates.

use rand::Rng;

/// Failures shown per phase.
pub const PER_PHASE_LIMIT: u32 = 2;

/// Failures shown per run.
pub const GLOBAL_LIMIT: u32 = 3;

/// Per-phase and per-run failure counters for one run.
///
/// Owned by the run and passed by `&mut`; there is no shared state between
/// runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryTracker {
    per_phase: u32,
    global: u32,
}

impl RetryTracker {
    /// Fresh counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures shown in the current phase.
    pub fn phase_count(&self) -> u32 {
        self.per_phase
    }

    /// Failures shown in the whole run.
    pub fn global_count(&self) -> u32 {
        self.global
    }

    /// Whether another failure could still be honoured.
    pub fn can_fail(&self) -> bool {
        self.per_phase < PER_PHASE_LIMIT && self.global < GLOBAL_LIMIT
    }

    /// Draw a failure at probability `p` and honour it only within budget.
    ///
    /// One value is drawn from `rng` on every call, whether or not the
    /// budget is spent, so a seeded run consumes randomness the same way
    /// regardless of earlier outcomes. `p` is clamped to `[0, 1]`; NaN
    /// counts as `0`.
    pub fn should_fail<R: Rng + ?Sized>(&mut self, p: f64, rng: &mut R) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        let draw: f64 = rng.random();
        if draw >= p || !self.can_fail() {
            return false;
        }
        self.per_phase += 1;
        self.global += 1;
        tracing::debug!(
            phase = self.per_phase,
            global = self.global,
            "cosmetic failure honoured"
        );
        true
    }

    /// Start a new phase: the per-phase budget is restored, the run budget
    /// is not.
    pub fn reset_phase(&mut self) {
        self.per_phase = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn certain_failures_hit_the_phase_cap() {
        let mut tracker = RetryTracker::new();
        let mut rng = rng();
        let results: Vec<bool> = (0..4).map(|_| tracker.should_fail(1.0, &mut rng)).collect();
        assert_eq!(results, vec![true, true, false, false]);
        assert_eq!(tracker.phase_count(), 2);
        assert_eq!(tracker.global_count(), 2);
    }

    #[test]
    fn reset_restores_phase_budget_but_not_run_budget() {
        let mut tracker = RetryTracker::new();
        let mut rng = rng();
        for _ in 0..4 {
            tracker.should_fail(1.0, &mut rng);
        }
        tracker.reset_phase();
        assert!(tracker.should_fail(1.0, &mut rng));
        assert_eq!(tracker.global_count(), GLOBAL_LIMIT);

        tracker.reset_phase();
        assert!(!tracker.should_fail(1.0, &mut rng));
        assert_eq!(tracker.phase_count(), 0);
    }

    #[test]
    fn zero_probability_never_fails() {
        let mut tracker = RetryTracker::new();
        let mut rng = rng();
        assert!((0..100).all(|_| !tracker.should_fail(0.0, &mut rng)));
        assert_eq!(tracker, RetryTracker::new());
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let mut rng = rng();
        let mut tracker = RetryTracker::new();
        assert!(tracker.should_fail(7.5, &mut rng));
        let mut tracker = RetryTracker::new();
        assert!(!tracker.should_fail(-1.0, &mut rng));
        assert!(!tracker.should_fail(f64::NAN, &mut rng));
    }
}
