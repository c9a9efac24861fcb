//! Process-wide counters for backtest runs.
//!
//! Counters are bumped silently at the call site; [`Metrics::flush`] emits
//! them as one `info!` event at the end of a run.

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    gameweeks_simulated: AtomicU64,
    substitutions_applied: AtomicU64,
    validation_failures: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            gameweeks_simulated: AtomicU64::new(0),
            substitutions_applied: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
        }
    }

    pub fn inc_gameweeks_simulated(&self) {
        self.gameweeks_simulated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "gameweeks_simulated", "counter incremented");
    }

    pub fn add_substitutions(&self, n: u64) {
        self.substitutions_applied.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "substitutions_applied", n, "counter incremented");
    }

    pub fn inc_validation_failures(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "validation_failures", "counter incremented");
    }

    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            gameweeks_simulated = self.gameweeks_simulated(),
            substitutions_applied = self.substitutions_applied(),
            validation_failures = self.validation_failures(),
        );
    }

    pub fn gameweeks_simulated(&self) -> u64 {
        self.gameweeks_simulated.load(Ordering::Relaxed)
    }

    pub fn substitutions_applied(&self) -> u64 {
        self.substitutions_applied.load(Ordering::Relaxed)
    }

    pub fn validation_failures(&self) -> u64 {
        self.validation_failures.load(Ordering::Relaxed)
    }

    /// Zero every counter (tests).
    pub fn reset(&self) {
        self.gameweeks_simulated.store(0, Ordering::Relaxed);
        self.substitutions_applied.store(0, Ordering::Relaxed);
        self.validation_failures.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset() {
        let m = Metrics::new();
        m.inc_gameweeks_simulated();
        m.inc_gameweeks_simulated();
        m.add_substitutions(3);
        m.inc_validation_failures();
        assert_eq!(m.gameweeks_simulated(), 2);
        assert_eq!(m.substitutions_applied(), 3);
        assert_eq!(m.validation_failures(), 1);

        m.reset();
        assert_eq!(m.gameweeks_simulated(), 0);
        assert_eq!(m.substitutions_applied(), 0);
        assert_eq!(m.validation_failures(), 0);
    }
}
