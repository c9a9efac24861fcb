//! Error taxonomy for the backtest engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::{PlayerId, Position};

/// Rule family a failure belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    SquadComposition,
    ClubLimit,
    Formation,
    BenchConfiguration,
    Captaincy,
    MissingPlayerData,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RuleCategory::SquadComposition => "squad composition",
            RuleCategory::ClubLimit => "club limit",
            RuleCategory::Formation => "formation",
            RuleCategory::BenchConfiguration => "bench configuration",
            RuleCategory::Captaincy => "captaincy",
            RuleCategory::MissingPlayerData => "missing player data",
        };
        f.write_str(s)
    }
}

/// Which part of the starting XI a formation bound applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "position", rename_all = "snake_case")]
pub enum FormationSubject {
    /// Total number of starters.
    Starters,
    /// Starters in one position.
    Position(Position),
}

impl fmt::Display for FormationSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormationSubject::Starters => f.write_str("players"),
            FormationSubject::Position(p) => write!(f, "{}", p),
        }
    }
}

/// Ways a bench can be misconfigured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BenchViolation {
    #[error("bench slot {slot} must hold exactly 1 player, found {found}")]
    SlotCount { slot: u8, found: usize },

    #[error("player {player_id} occupies more than one bench slot")]
    DuplicatePlayer { player_id: PlayerId },

    #[error("bench slot {slot} player {player_id} is also a starter")]
    AlsoStarting { slot: u8, player_id: PlayerId },

    #[error("bench slot {slot} player {player_id} is not in the squad")]
    NotInSquad { slot: u8, player_id: PlayerId },

    #[error("bench slot 1 must be a GK, found {found}")]
    SlotOneNotGoalkeeper { found: Position },

    #[error("bench slot {slot} must be an outfield player, found GK")]
    GoalkeeperInOutfieldSlot { slot: u8 },

    #[error(
        "starters and bench must partition the squad: {unassigned} squad players unassigned, \
         {outside} starters outside the squad"
    )]
    SquadNotPartitioned { unassigned: usize, outside: usize },
}

/// Ways the armbands can be misassigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptaincyViolation {
    #[error("exactly 1 captain required, found {found}")]
    CaptainCount { found: usize },

    #[error("exactly 1 vice-captain required, found {found}")]
    ViceCaptainCount { found: usize },

    #[error("captain and vice-captain must be different players (both {player_id})")]
    SamePlayer { player_id: PlayerId },

    #[error("captain {player_id} must be in the starting XI")]
    CaptainNotStarting { player_id: PlayerId },

    #[error("vice-captain {player_id} must be in the starting XI")]
    ViceCaptainNotStarting { player_id: PlayerId },
}

/// A broken squad rule, as reported by the validator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationError {
    #[error(
        "squad must be 2 GK, 5 DEF, 5 MID, 3 FWD (15 players), found {size} players: \
         {gk} GK, {def} DEF, {mid} MID, {fwd} FWD"
    )]
    SquadComposition {
        size: usize,
        gk: usize,
        def: usize,
        mid: usize,
        fwd: usize,
    },

    #[error("maximum 3 players per club, {club} has {count}")]
    ClubLimit { club: String, count: usize },

    #[error("starting XI must have {min}-{max} {subject}, found {found}")]
    Formation {
        subject: FormationSubject,
        found: usize,
        min: usize,
        max: usize,
    },

    #[error("bench configuration: {0}")]
    BenchConfiguration(BenchViolation),

    #[error("captaincy: {0}")]
    Captaincy(CaptaincyViolation),
}

impl ValidationError {
    pub fn category(&self) -> RuleCategory {
        match self {
            ValidationError::SquadComposition { .. } => RuleCategory::SquadComposition,
            ValidationError::ClubLimit { .. } => RuleCategory::ClubLimit,
            ValidationError::Formation { .. } => RuleCategory::Formation,
            ValidationError::BenchConfiguration(_) => RuleCategory::BenchConfiguration,
            ValidationError::Captaincy(_) => RuleCategory::Captaincy,
        }
    }
}

/// Backtest engine errors.
#[derive(Debug, thiserror::Error)]
pub enum FplError {
    #[error("gameweek {gameweek}: {error}")]
    Validation {
        gameweek: u32,
        error: ValidationError,
    },

    #[error("no stats row for player {player_id} in gameweek {gameweek}")]
    MissingPlayerData { player_id: PlayerId, gameweek: u32 },

    #[error("duplicate stats row for player {player_id} in gameweek {gameweek}")]
    DuplicateRow { player_id: PlayerId, gameweek: u32 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FplError {
    /// The rule family for errors that abort a season, `None` for input errors.
    pub fn category(&self) -> Option<RuleCategory> {
        match self {
            FplError::Validation { error, .. } => Some(error.category()),
            FplError::MissingPlayerData { .. } => Some(RuleCategory::MissingPlayerData),
            _ => None,
        }
    }

    /// The underlying squad rule violation, if this is one.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            FplError::Validation { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// A broken rule or missing data, reduced to a tag and a readable detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleFailure {
    pub category: RuleCategory,
    pub detail: String,
}

impl RuleFailure {
    /// Reduce a season-aborting error. Input errors yield `None`.
    pub fn from_error(err: &FplError) -> Option<Self> {
        match err {
            FplError::Validation { error, .. } => Some(Self {
                category: error.category(),
                detail: error.to_string(),
            }),
            FplError::MissingPlayerData { .. } => Some(Self {
                category: RuleCategory::MissingPlayerData,
                detail: err.to_string(),
            }),
            _ => None,
        }
    }
}

/// Result type for backtest operations.
pub type Result<T> = std::result::Result<T, FplError>;
