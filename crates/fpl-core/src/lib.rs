//! FPL season backtest engine.
//!
//! Replays an optimizer's season plan against realized player stats:
//! validates each gameweek's squad, resolves automatic substitutions,
//! scores the gameweek with captaincy doubling, and tracks transfers and
//! running totals across the season.

pub mod backtest;
pub mod config;
pub mod digest;
pub mod domain;
pub mod fixtures;
pub mod formation;
pub mod metrics;
pub mod obs;
pub mod plan;
pub mod reporting;
pub mod scoring;
pub mod stats;
pub mod substitution;
pub mod telemetry;
pub mod transfers;
pub mod validator;

pub use domain::{
    BenchViolation, CaptaincyViolation, FormationSubject, FplError, PlayerId, PlayerIdentity,
    PlayerRecord, Position, Result, RoleAssignment, RuleCategory, RuleFailure, ValidatedSelection,
    ValidationError, BENCH_SLOTS, SQUAD_SIZE, STARTING_XI,
};

pub use backtest::{
    validate_plan, BenchEntry, FailureReason, GameweekRecord, GameweekValidation, LineupEntry,
    SeasonBacktest, SeasonOutcome, SeasonReport, SeasonSummary,
};
pub use config::{BacktestConfig, SEASON_GAMEWEEKS};
pub use formation::PositionCounts;
pub use metrics::METRICS;
pub use obs::{
    emit_gameweek_missing, emit_gameweek_simulated, emit_gameweek_transfers,
    emit_season_finished, emit_season_started, emit_validation_failed, SeasonSpan,
};
pub use plan::SeasonPlan;
pub use reporting::{
    read_artifact_json, render_report_text, write_artifact_json, BacktestArtifact,
};
pub use scoring::{compute_score, Armband, CaptaincyOutcome, GameweekScore};
pub use stats::{GameweekStats, GameweekView, StatsTable};
pub use substitution::{
    resolve_active_lineup, ActiveLineup, BenchDecision, BenchOutcome, Substitution,
};
pub use telemetry::init_tracing;
pub use transfers::{diff_squads, SquadDiff, TransferSummary};
pub use validator::{validate_selection, SquadRule, ValidationStatus};
