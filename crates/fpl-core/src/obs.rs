//! Structured events for the season backtest lifecycle.
//!
//! - `SeasonSpan` RAII guard tags everything inside a run with its run id
//! - `emit_*` functions log the key transitions at `info!` / `warn!`
//!
//! Filtering follows `RUST_LOG`; see [`crate::telemetry::init_tracing`].

use tracing::{info, warn};

use crate::domain::RuleCategory;

/// RAII guard that enters a run-scoped span for the duration of a season.
///
/// ```ignore
/// let _span = SeasonSpan::enter("3f2c...");
/// // every event below carries run_id = "3f2c..."
/// ```
pub struct SeasonSpan {
    _span: tracing::span::EnteredSpan,
}

impl SeasonSpan {
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("fpl.season", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_season_started(run_id: &str, first_gameweek: u32, last_gameweek: u32, planned: usize) {
    info!(
        event = "season.started",
        run_id = %run_id,
        first_gameweek,
        last_gameweek,
        planned_gameweeks = planned,
    );
}

pub fn emit_gameweek_simulated(
    gameweek: u32,
    score: i32,
    cumulative: i64,
    substitutions: usize,
    captaincy: &str,
) {
    info!(
        event = "gameweek.simulated",
        gameweek,
        score,
        cumulative,
        substitutions,
        captaincy = %captaincy,
    );
}

pub fn emit_gameweek_transfers(gameweek: u32, count: usize, initial: bool) {
    info!(event = "gameweek.transfers", gameweek, count, initial);
}

/// Warning: the season stops here.
pub fn emit_validation_failed(gameweek: u32, category: RuleCategory, detail: &str) {
    warn!(
        event = "gameweek.validation_failed",
        gameweek,
        category = %category,
        detail = %detail,
    );
}

/// Warning: no plan entry for a gameweek inside the configured range.
pub fn emit_gameweek_missing(gameweek: u32) {
    warn!(event = "gameweek.missing", gameweek);
}

pub fn emit_season_finished(run_id: &str, completed: usize, total_score: i64, aborted: bool) {
    info!(
        event = "season.finished",
        run_id = %run_id,
        completed,
        total_score,
        aborted,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_span_enters_without_subscriber() {
        let _span = SeasonSpan::enter("test-run");
        emit_gameweek_missing(7);
    }
}
