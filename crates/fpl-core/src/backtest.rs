//! Season backtest orchestrator.
//!
//! Each gameweek moves `Pending -> Validated -> Simulated` and is then
//! committed to the season state (running score, transfer count, previous
//! squad). A broken squad rule or missing stats row moves it to `Failed`
//! instead, which aborts the whole season: later gameweeks are not looked
//! at.
//!
//! With `prevalidate` set, every gameweek is validated up front on the rayon
//! pool. The sequential pass then consumes those results in order, so the
//! report is the same as without it.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BacktestConfig;
use crate::domain::{
    FplError, PlayerId, PlayerIdentity, Result, RoleAssignment, RuleCategory, RuleFailure,
    ValidatedSelection,
};
use crate::metrics::METRICS;
use crate::obs::{self, SeasonSpan};
use crate::plan::SeasonPlan;
use crate::scoring::{compute_score, Armband, GameweekScore};
use crate::stats::{GameweekView, StatsTable};
use crate::substitution::{resolve_active_lineup, ActiveLineup, BenchDecision, Substitution};
use crate::transfers::{diff_squads, TransferSummary};
use crate::validator::{validate_selection, ValidationStatus};

/// Why a season stopped early.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureReason {
    pub gameweek: u32,
    pub category: RuleCategory,
    pub detail: String,
}

impl FailureReason {
    fn new(gameweek: u32, failure: RuleFailure) -> Self {
        Self {
            gameweek,
            category: failure.category,
            detail: failure.detail,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeasonOutcome {
    Complete,
    Aborted { reason: FailureReason },
}

/// A player who counted for scoring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineupEntry {
    #[serde(flatten)]
    pub player: PlayerIdentity,
    pub points: i32,
    pub minutes: u32,
    pub armband: Option<Armband>,
    /// Came on from the bench.
    pub substitute: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BenchEntry {
    pub slot: u8,
    #[serde(flatten)]
    pub player: PlayerIdentity,
    pub points: i32,
    pub minutes: u32,
    pub decision: BenchDecision,
}

/// Everything that happened in one simulated gameweek.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameweekRecord {
    pub gameweek: u32,
    pub validation: ValidationStatus,
    /// Outfield shape of the active lineup, e.g. `4-4-2`.
    pub formation: String,
    /// Active lineup ordered GK, DEF, MID, FWD.
    pub lineup: Vec<LineupEntry>,
    pub bench: Vec<BenchEntry>,
    pub substitutions: Vec<Substitution>,
    pub captain: PlayerIdentity,
    pub vice_captain: PlayerIdentity,
    pub score: GameweekScore,
    pub cumulative_score: i64,
    pub transfers: TransferSummary,
    pub bank: Option<i64>,
    pub free_transfers: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonSummary {
    pub total_score: i64,
    pub total_transfers: usize,
    pub gameweeks_completed: usize,
    /// Mean score over completed gameweeks, 0 when none completed.
    pub average_score: f64,
    /// Gameweeks in range with no plan entry.
    pub skipped_gameweeks: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonReport {
    pub outcome: SeasonOutcome,
    pub gameweeks: Vec<GameweekRecord>,
    pub summary: SeasonSummary,
}

impl SeasonReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, SeasonOutcome::Complete)
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match &self.outcome {
            SeasonOutcome::Aborted { reason } => Some(reason),
            SeasonOutcome::Complete => None,
        }
    }

    pub fn record(&self, gameweek: u32) -> Option<&GameweekRecord> {
        self.gameweeks.iter().find(|r| r.gameweek == gameweek)
    }
}

/// One gameweek's validation result, for validate-only runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameweekValidation {
    pub gameweek: u32,
    pub status: ValidationStatus,
}

/// Carried from one gameweek to the next. Only the orchestrator writes it.
#[derive(Debug, Default)]
struct SeasonState {
    previous_squad: Option<BTreeSet<PlayerId>>,
    cumulative_score: i64,
    total_transfers: usize,
    records: Vec<GameweekRecord>,
    skipped: Vec<u32>,
}

impl SeasonState {
    fn commit(&mut self, record: GameweekRecord, squad: BTreeSet<PlayerId>) {
        self.cumulative_score = record.cumulative_score;
        self.total_transfers += record.transfers.count();

        METRICS.inc_gameweeks_simulated();
        METRICS.add_substitutions(record.substitutions.len() as u64);
        obs::emit_gameweek_simulated(
            record.gameweek,
            record.score.total,
            record.cumulative_score,
            record.substitutions.len(),
            record.score.captaincy.label(),
        );
        obs::emit_gameweek_transfers(
            record.gameweek,
            record.transfers.count(),
            record.transfers.is_initial(),
        );

        self.previous_squad = Some(squad);
        self.records.push(record);
    }

    fn finish(self, outcome: SeasonOutcome) -> SeasonReport {
        let completed = self.records.len();
        let average_score = if completed == 0 {
            0.0
        } else {
            self.cumulative_score as f64 / completed as f64
        };
        SeasonReport {
            outcome,
            gameweeks: self.records,
            summary: SeasonSummary {
                total_score: self.cumulative_score,
                total_transfers: self.total_transfers,
                gameweeks_completed: completed,
                average_score,
                skipped_gameweeks: self.skipped,
            },
        }
    }
}

/// Where a single gameweek is in its lifecycle.
enum GameweekState {
    Pending,
    Validated(ValidatedSelection),
    Simulated {
        selection: ValidatedSelection,
        lineup: ActiveLineup,
        score: GameweekScore,
    },
    Failed(FailureReason),
}

impl GameweekState {
    /// Season-aborting errors become `Failed`; anything else propagates.
    fn failed(gameweek: u32, err: FplError) -> Result<Self> {
        match RuleFailure::from_error(&err) {
            Some(failure) => Ok(GameweekState::Failed(FailureReason::new(gameweek, failure))),
            None => Err(err),
        }
    }
}

/// Runs a season plan against realized stats.
pub struct SeasonBacktest<'a> {
    plan: &'a SeasonPlan,
    stats: &'a StatsTable,
    config: BacktestConfig,
    run_id: String,
}

impl<'a> SeasonBacktest<'a> {
    pub fn new(plan: &'a SeasonPlan, stats: &'a StatsTable, config: BacktestConfig) -> Self {
        Self {
            plan,
            stats,
            config,
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Simulate every configured gameweek in order.
    ///
    /// A broken rule or missing stats row is not an `Err`: it ends the season
    /// with [`SeasonOutcome::Aborted`] and the records simulated so far.
    ///
    /// # Errors
    ///
    /// `FplError::InvalidInput` for an empty gameweek range.
    pub fn run(&self) -> Result<SeasonReport> {
        self.config.validate()?;
        let _span = SeasonSpan::enter(&self.run_id);

        let planned: Vec<&RoleAssignment> = self
            .config
            .gameweeks()
            .filter_map(|gw| self.plan.get(gw))
            .collect();
        obs::emit_season_started(
            &self.run_id,
            self.config.first_gameweek,
            self.config.last_gameweek,
            planned.len(),
        );

        let mut prevalidated = if self.config.prevalidate {
            self.prevalidate(&planned)
        } else {
            BTreeMap::new()
        };

        let mut state = SeasonState::default();
        let mut outcome = SeasonOutcome::Complete;
        for gw in self.config.gameweeks() {
            let Some(assignment) = self.plan.get(gw) else {
                obs::emit_gameweek_missing(gw);
                state.skipped.push(gw);
                continue;
            };
            if let Some(reason) = self.step(&mut state, assignment, prevalidated.remove(&gw))? {
                METRICS.inc_validation_failures();
                obs::emit_validation_failed(reason.gameweek, reason.category, &reason.detail);
                outcome = SeasonOutcome::Aborted { reason };
                break;
            }
        }

        let report = state.finish(outcome);
        obs::emit_season_finished(
            &self.run_id,
            report.summary.gameweeks_completed,
            report.summary.total_score,
            !report.is_complete(),
        );
        METRICS.flush();
        Ok(report)
    }

    /// Validate every planned gameweek on the rayon pool.
    fn prevalidate(
        &self,
        planned: &[&RoleAssignment],
    ) -> BTreeMap<u32, Result<ValidatedSelection>> {
        let results: BTreeMap<u32, Result<ValidatedSelection>> = planned
            .par_iter()
            .map(|a| (a.gameweek, validate_selection(a, self.stats.gameweek(a.gameweek))))
            .collect();
        if let Some((gw, _)) = results.iter().find(|(_, r)| r.is_err()) {
            tracing::debug!(gameweek = gw, "prevalidation found a failing gameweek");
        }
        results
    }

    /// Drive one gameweek to `Simulated` (committed) or `Failed`.
    fn step(
        &self,
        state: &mut SeasonState,
        assignment: &RoleAssignment,
        mut prevalidated: Option<Result<ValidatedSelection>>,
    ) -> Result<Option<FailureReason>> {
        let gw = assignment.gameweek;
        let view = self.stats.gameweek(gw);
        let mut current = GameweekState::Pending;
        loop {
            current = match current {
                GameweekState::Pending => {
                    let result = prevalidated
                        .take()
                        .unwrap_or_else(|| validate_selection(assignment, view));
                    match result {
                        Ok(selection) => GameweekState::Validated(selection),
                        Err(err) => GameweekState::failed(gw, err)?,
                    }
                }
                GameweekState::Validated(selection) => match simulate(&selection, view) {
                    Ok((lineup, score)) => GameweekState::Simulated {
                        selection,
                        lineup,
                        score,
                    },
                    Err(err) => GameweekState::failed(gw, err)?,
                },
                GameweekState::Simulated {
                    selection,
                    lineup,
                    score,
                } => match self.record(state, assignment, &selection, &lineup, score) {
                    Ok(record) => {
                        state.commit(record, selection.squad);
                        return Ok(None);
                    }
                    Err(err) => GameweekState::failed(gw, err)?,
                },
                GameweekState::Failed(reason) => return Ok(Some(reason)),
            };
        }
    }

    fn record(
        &self,
        state: &SeasonState,
        assignment: &RoleAssignment,
        selection: &ValidatedSelection,
        lineup: &ActiveLineup,
        score: GameweekScore,
    ) -> Result<GameweekRecord> {
        let gw = selection.gameweek;
        let view = self.stats.gameweek(gw);
        let transfers = diff_squads(
            state.previous_squad.as_ref(),
            &selection.squad,
            gw,
            self.stats,
        )?;

        let mut entries = Vec::with_capacity(lineup.len());
        for &id in &lineup.players {
            let row = view.player(id)?;
            let armband = if id == selection.captain {
                Some(Armband::Captain)
            } else if id == selection.vice_captain {
                Some(Armband::ViceCaptain)
            } else {
                None
            };
            entries.push(LineupEntry {
                player: row.identity(),
                points: row.points,
                minutes: row.minutes,
                armband,
                substitute: lineup.substitutions.iter().any(|s| s.player_id == id),
            });
        }
        entries.sort_by_key(|e| (e.player.position, e.player.player_id));

        let mut bench = Vec::with_capacity(lineup.bench.len());
        for outcome in &lineup.bench {
            let row = view.player(outcome.player_id)?;
            bench.push(BenchEntry {
                slot: outcome.slot,
                player: row.identity(),
                points: row.points,
                minutes: row.minutes,
                decision: outcome.decision,
            });
        }

        Ok(GameweekRecord {
            gameweek: gw,
            validation: ValidationStatus::Valid,
            formation: lineup.counts.shape(),
            lineup: entries,
            bench,
            substitutions: lineup.substitutions.clone(),
            captain: view.player(selection.captain)?.identity(),
            vice_captain: view.player(selection.vice_captain)?.identity(),
            score,
            cumulative_score: state.cumulative_score + i64::from(score.total),
            transfers,
            bank: assignment.bank,
            free_transfers: assignment.free_transfers,
        })
    }
}

fn simulate(
    selection: &ValidatedSelection,
    view: GameweekView<'_>,
) -> Result<(ActiveLineup, GameweekScore)> {
    let lineup = resolve_active_lineup(selection, view)?;
    let score = compute_score(&lineup, selection.captain, selection.vice_captain, view)?;
    Ok((lineup, score))
}

/// Validate every planned gameweek in range without simulating, in
/// gameweek order. Unlike a season run this does not stop at the first
/// failure.
pub fn validate_plan(
    plan: &SeasonPlan,
    stats: &StatsTable,
    config: &BacktestConfig,
) -> Result<Vec<GameweekValidation>> {
    config.validate()?;
    let planned: Vec<&RoleAssignment> = config
        .gameweeks()
        .filter_map(|gw| plan.get(gw))
        .collect();
    planned
        .par_iter()
        .map(|a| {
            let status =
                ValidationStatus::from_result(validate_selection(a, stats.gameweek(a.gameweek)))?;
            Ok(GameweekValidation {
                gameweek: a.gameweek,
                status,
            })
        })
        .collect()
}
