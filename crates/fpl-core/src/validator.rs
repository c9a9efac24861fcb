//! Squad rules engine.
//!
//! Checks a [`RoleAssignment`] against the league's squad rules in a fixed
//! order and stops at the first broken rule:
//!
//! 1. squad composition (2 GK, 5 DEF, 5 MID, 3 FWD)
//! 2. at most 3 players from any one club
//! 3. starting XI formation
//! 4. bench configuration
//! 5. captaincy
//!
//! A passing assignment comes back as a [`ValidatedSelection`], the only
//! input the simulation accepts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{
    BenchViolation, CaptaincyViolation, FplError, PlayerId, Position, Result, RoleAssignment,
    RuleFailure, ValidatedSelection, ValidationError, BENCH_SLOTS, SQUAD_SIZE,
};
use crate::formation::{PositionCounts, SQUAD_QUOTA};
use crate::stats::GameweekView;

/// Maximum squad members from a single club.
pub const MAX_PER_CLUB: usize = 3;

/// A single squad rule, in evaluation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SquadRule {
    SquadComposition,
    ClubLimit,
    StartingFormation,
    BenchConfiguration,
    Captaincy,
}

impl SquadRule {
    /// Evaluation order. The first failure short-circuits the rest.
    pub const ORDER: [SquadRule; 5] = [
        SquadRule::SquadComposition,
        SquadRule::ClubLimit,
        SquadRule::StartingFormation,
        SquadRule::BenchConfiguration,
        SquadRule::Captaincy,
    ];
}

/// Serializable pass/fail status for one gameweek's assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    Failed(RuleFailure),
}

impl ValidationStatus {
    pub fn passed(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }

    /// Status for a validation outcome. Errors that are not rule failures
    /// are handed back.
    pub fn from_result(result: Result<ValidatedSelection>) -> Result<Self> {
        match result {
            Ok(_) => Ok(ValidationStatus::Valid),
            Err(err) => match RuleFailure::from_error(&err) {
                Some(failure) => Ok(ValidationStatus::Failed(failure)),
                None => Err(err),
            },
        }
    }
}

/// Validate one gameweek's role assignment against the squad rules.
///
/// # Errors
///
/// - `FplError::Validation` carrying the first broken rule.
/// - `FplError::MissingPlayerData` when a referenced player has no stats row
///   for the gameweek.
pub fn validate_selection(
    assignment: &RoleAssignment,
    stats: GameweekView<'_>,
) -> Result<ValidatedSelection> {
    for rule in SquadRule::ORDER {
        if let Some(error) = check_rule(rule, assignment, stats)? {
            tracing::debug!(
                gameweek = assignment.gameweek,
                rule = ?rule,
                %error,
                "squad rule failed"
            );
            return Err(FplError::Validation {
                gameweek: assignment.gameweek,
                error,
            });
        }
    }
    Ok(into_selection(assignment))
}

fn check_rule(
    rule: SquadRule,
    assignment: &RoleAssignment,
    stats: GameweekView<'_>,
) -> Result<Option<ValidationError>> {
    match rule {
        SquadRule::SquadComposition => check_composition(assignment, stats),
        SquadRule::ClubLimit => check_club_limit(assignment, stats),
        SquadRule::StartingFormation => check_formation(assignment, stats),
        SquadRule::BenchConfiguration => check_bench(assignment, stats),
        SquadRule::Captaincy => Ok(check_captaincy(assignment).err()),
    }
}

fn position_counts(players: &BTreeSet<PlayerId>, stats: GameweekView<'_>) -> Result<PositionCounts> {
    let mut counts = PositionCounts::default();
    for &id in players {
        counts.add(stats.player(id)?.position);
    }
    Ok(counts)
}

fn check_composition(
    assignment: &RoleAssignment,
    stats: GameweekView<'_>,
) -> Result<Option<ValidationError>> {
    let counts = position_counts(&assignment.squad, stats)?;
    if assignment.squad.len() == SQUAD_SIZE && counts == SQUAD_QUOTA {
        return Ok(None);
    }
    Ok(Some(ValidationError::SquadComposition {
        size: assignment.squad.len(),
        gk: counts.gk,
        def: counts.def,
        mid: counts.mid,
        fwd: counts.fwd,
    }))
}

fn check_club_limit(
    assignment: &RoleAssignment,
    stats: GameweekView<'_>,
) -> Result<Option<ValidationError>> {
    let mut per_club: BTreeMap<&str, usize> = BTreeMap::new();
    for &id in &assignment.squad {
        *per_club.entry(stats.player(id)?.team.as_str()).or_default() += 1;
    }
    Ok(per_club
        .into_iter()
        .find(|(_, count)| *count > MAX_PER_CLUB)
        .map(|(club, count)| ValidationError::ClubLimit {
            club: club.to_string(),
            count,
        }))
}

fn check_formation(
    assignment: &RoleAssignment,
    stats: GameweekView<'_>,
) -> Result<Option<ValidationError>> {
    let counts = position_counts(&assignment.starters, stats)?;
    Ok(counts.check_starting_xi().err())
}

fn check_bench(
    assignment: &RoleAssignment,
    stats: GameweekView<'_>,
) -> Result<Option<ValidationError>> {
    let mut occupants = Vec::with_capacity(BENCH_SLOTS);
    for (idx, slot) in assignment.bench.iter().enumerate() {
        let slot_no = idx as u8 + 1;
        match slot.iter().next() {
            Some(&id) if slot.len() == 1 => occupants.push((slot_no, id)),
            _ => {
                return bench_error(BenchViolation::SlotCount {
                    slot: slot_no,
                    found: slot.len(),
                })
            }
        }
    }

    let mut seen = BTreeSet::new();
    for &(_, id) in &occupants {
        if !seen.insert(id) {
            return bench_error(BenchViolation::DuplicatePlayer { player_id: id });
        }
    }

    for &(slot, id) in &occupants {
        if !assignment.squad.contains(&id) {
            return bench_error(BenchViolation::NotInSquad {
                slot,
                player_id: id,
            });
        }
        if assignment.starters.contains(&id) {
            return bench_error(BenchViolation::AlsoStarting {
                slot,
                player_id: id,
            });
        }
    }

    for &(slot, id) in &occupants {
        let position = stats.player(id)?.position;
        if slot == 1 && position != Position::GK {
            return bench_error(BenchViolation::SlotOneNotGoalkeeper { found: position });
        }
        if slot != 1 && position.is_goalkeeper() {
            return bench_error(BenchViolation::GoalkeeperInOutfieldSlot { slot });
        }
    }

    let outside = assignment.starters.difference(&assignment.squad).count();
    let unassigned = assignment
        .squad
        .iter()
        .filter(|&id| !assignment.starters.contains(id) && !seen.contains(id))
        .count();
    if outside > 0 || unassigned > 0 {
        return bench_error(BenchViolation::SquadNotPartitioned {
            unassigned,
            outside,
        });
    }

    Ok(None)
}

fn bench_error(violation: BenchViolation) -> Result<Option<ValidationError>> {
    Ok(Some(ValidationError::BenchConfiguration(violation)))
}

fn check_captaincy(assignment: &RoleAssignment) -> std::result::Result<(), ValidationError> {
    let captain = single(&assignment.captain).ok_or(ValidationError::Captaincy(
        CaptaincyViolation::CaptainCount {
            found: assignment.captain.len(),
        },
    ))?;
    let vice = single(&assignment.vice_captain).ok_or(ValidationError::Captaincy(
        CaptaincyViolation::ViceCaptainCount {
            found: assignment.vice_captain.len(),
        },
    ))?;

    let violation = if captain == vice {
        Some(CaptaincyViolation::SamePlayer { player_id: captain })
    } else if !assignment.starters.contains(&captain) {
        Some(CaptaincyViolation::CaptainNotStarting { player_id: captain })
    } else if !assignment.starters.contains(&vice) {
        Some(CaptaincyViolation::ViceCaptainNotStarting { player_id: vice })
    } else {
        None
    };

    match violation {
        Some(v) => Err(ValidationError::Captaincy(v)),
        None => Ok(()),
    }
}

fn single(set: &BTreeSet<PlayerId>) -> Option<PlayerId> {
    match set.len() {
        1 => set.iter().next().copied(),
        _ => None,
    }
}

/// Only called once every rule has passed, so each role holds one player.
fn into_selection(assignment: &RoleAssignment) -> ValidatedSelection {
    let first = |set: &BTreeSet<PlayerId>| set.iter().next().copied().unwrap_or(PlayerId(0));
    ValidatedSelection {
        gameweek: assignment.gameweek,
        squad: assignment.squad.clone(),
        starters: assignment.starters.clone(),
        bench: [
            first(&assignment.bench[0]),
            first(&assignment.bench[1]),
            first(&assignment.bench[2]),
            first(&assignment.bench[3]),
        ],
        captain: first(&assignment.captain),
        vice_captain: first(&assignment.vice_captain),
    }
}
