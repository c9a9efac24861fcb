//! Squad role assignments, before and after validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Number of players in a squad.
pub const SQUAD_SIZE: usize = 15;
/// Number of players in a starting XI.
pub const STARTING_XI: usize = 11;
/// Number of ordered bench slots.
pub const BENCH_SLOTS: usize = 4;

/// One gameweek of optimizer output, expressed as sets of players per role.
///
/// Nothing here is guaranteed to be legal: a role may hold zero or several
/// players. [`crate::validator::validate_selection`] turns this into a
/// [`ValidatedSelection`] or reports the first broken rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoleAssignment {
    pub gameweek: u32,
    pub squad: BTreeSet<PlayerId>,
    pub starters: BTreeSet<PlayerId>,
    pub captain: BTreeSet<PlayerId>,
    pub vice_captain: BTreeSet<PlayerId>,
    /// Bench slots 1..=4, index 0 is slot 1.
    pub bench: [BTreeSet<PlayerId>; BENCH_SLOTS],
    /// Money in the bank reported by the optimizer, in tenths.
    pub bank: Option<i64>,
    /// Free transfers available reported by the optimizer.
    pub free_transfers: Option<i64>,
}

impl RoleAssignment {
    pub fn new(gameweek: u32) -> Self {
        Self {
            gameweek,
            ..Self::default()
        }
    }
}

/// A role assignment that passed every squad rule.
///
/// Only the validator constructs this; simulation functions accept nothing
/// else, so an unchecked assignment cannot be simulated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatedSelection {
    pub gameweek: u32,
    pub squad: BTreeSet<PlayerId>,
    pub starters: BTreeSet<PlayerId>,
    /// Bench in priority order, slot 1 first.
    pub bench: [PlayerId; BENCH_SLOTS],
    pub captain: PlayerId,
    pub vice_captain: PlayerId,
}
