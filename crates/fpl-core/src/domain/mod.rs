//! Domain models for the season backtester.
//!
//! - `PlayerRecord`: one stats-table row for a player in a gameweek
//! - `RoleAssignment`: optimizer output for a gameweek, as role sets
//! - `ValidatedSelection`: an assignment that passed every squad rule
//! - `FplError` / `ValidationError`: error taxonomy

pub mod error;
pub mod player;
pub mod selection;

pub use error::{
    BenchViolation, CaptaincyViolation, FormationSubject, FplError, Result, RuleCategory,
    RuleFailure, ValidationError,
};
pub use player::{PlayerId, PlayerIdentity, PlayerRecord, Position};
pub use selection::{RoleAssignment, ValidatedSelection, BENCH_SLOTS, SQUAD_SIZE, STARTING_XI};
