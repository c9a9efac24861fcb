//! Automatic substitutions.
//!
//! Starters with zero minutes drop out. The bench is then walked in slot
//! order, and each bench player who played joins the active lineup if the
//! lineup stays legal with them in it. The walk ends once 11 players are
//! active or every slot has been tried. Ending below 11 is a normal outcome.

use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, Position, Result, ValidatedSelection, STARTING_XI};
use crate::formation::PositionCounts;
use crate::stats::GameweekView;

/// What happened to one bench slot during resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BenchDecision {
    /// Played and joined the active lineup.
    Substituted,
    /// Zero minutes; skipped.
    DidNotPlay,
    /// Played, but adding them would have broken the formation.
    FormationBlocked,
    /// The lineup was already full before this slot was reached.
    NotNeeded,
}

/// A bench player who was brought into the active lineup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Substitution {
    pub slot: u8,
    pub player_id: PlayerId,
    pub position: Position,
    pub points: i32,
    pub minutes: u32,
}

/// Outcome for one bench slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BenchOutcome {
    pub slot: u8,
    pub player_id: PlayerId,
    pub decision: BenchDecision,
}

/// The players who count for scoring this gameweek.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveLineup {
    /// Starters who played (ascending id), then substitutes in slot order.
    pub players: Vec<PlayerId>,
    pub substitutions: Vec<Substitution>,
    pub bench: Vec<BenchOutcome>,
    pub counts: PositionCounts,
}

impl ActiveLineup {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.contains(&player_id)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() == STARTING_XI
    }
}

/// Lineup under construction: the tentative set plus its position tally.
struct Tentative {
    players: Vec<PlayerId>,
    counts: PositionCounts,
}

impl Tentative {
    fn is_full(&self) -> bool {
        self.players.len() >= STARTING_XI
    }

    /// Add the player if the enlarged lineup is still legal.
    fn try_add(&mut self, player_id: PlayerId, position: Position) -> bool {
        let candidate = self.counts.with(position);
        if !candidate.is_legal_active_lineup() {
            return false;
        }
        self.counts = candidate;
        self.players.push(player_id);
        true
    }
}

/// Resolve the active lineup for a validated selection.
///
/// # Errors
///
/// `FplError::MissingPlayerData` if a starter or bench player has no stats
/// row for the gameweek.
pub fn resolve_active_lineup(
    selection: &ValidatedSelection,
    stats: GameweekView<'_>,
) -> Result<ActiveLineup> {
    let mut lineup = Tentative {
        players: Vec::with_capacity(STARTING_XI),
        counts: PositionCounts::default(),
    };
    for &id in &selection.starters {
        let row = stats.player(id)?;
        if row.played() {
            lineup.players.push(id);
            lineup.counts.add(row.position);
        } else {
            tracing::trace!(gameweek = selection.gameweek, player_id = %id, "starter did not play");
        }
    }

    let mut substitutions = Vec::new();
    let mut bench = Vec::with_capacity(selection.bench.len());
    for (idx, &id) in selection.bench.iter().enumerate() {
        let slot = idx as u8 + 1;
        let row = stats.player(id)?;
        let decision = if lineup.is_full() {
            BenchDecision::NotNeeded
        } else if !row.played() {
            BenchDecision::DidNotPlay
        } else if lineup.try_add(id, row.position) {
            substitutions.push(Substitution {
                slot,
                player_id: id,
                position: row.position,
                points: row.points,
                minutes: row.minutes,
            });
            BenchDecision::Substituted
        } else {
            BenchDecision::FormationBlocked
        };
        tracing::debug!(
            gameweek = selection.gameweek,
            slot,
            player_id = %id,
            decision = ?decision,
            "bench slot resolved"
        );
        bench.push(BenchOutcome {
            slot,
            player_id: id,
            decision,
        });
    }

    Ok(ActiveLineup {
        players: lineup.players,
        substitutions,
        bench,
        counts: lineup.counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SquadFixture;
    use crate::validator::validate_selection;

    fn resolve(fx: &SquadFixture) -> ActiveLineup {
        let selection =
            validate_selection(&fx.assignment, fx.stats.gameweek(fx.gameweek())).expect("valid");
        resolve_active_lineup(&selection, fx.stats.gameweek(fx.gameweek())).expect("resolve")
    }

    #[test]
    fn full_attendance_needs_no_bench() {
        let fx = SquadFixture::standard(1);
        let lineup = resolve(&fx);
        assert_eq!(lineup.len(), 11);
        assert!(lineup.substitutions.is_empty());
        assert!(lineup
            .bench
            .iter()
            .all(|b| b.decision == BenchDecision::NotNeeded));
    }

    #[test]
    fn bench_keeper_blocked_while_starting_keeper_played() {
        let mut fx = SquadFixture::standard(1);
        // Striker out; bench keeper played but cannot come on.
        fx.set_minutes(14, 0).set_minutes(7, 0);
        let lineup = resolve(&fx);
        assert_eq!(lineup.bench[0].decision, BenchDecision::FormationBlocked);
        assert_eq!(lineup.bench[1].decision, BenchDecision::DidNotPlay);
        assert_eq!(lineup.bench[2].decision, BenchDecision::Substituted);
        assert_eq!(lineup.bench[3].decision, BenchDecision::NotNeeded);
        assert_eq!(lineup.counts.gk, 1);
    }

    #[test]
    fn bench_keeper_replaces_absent_keeper() {
        let mut fx = SquadFixture::standard(1);
        fx.set_minutes(1, 0);
        let lineup = resolve(&fx);
        assert_eq!(lineup.substitutions.len(), 1);
        assert_eq!(lineup.substitutions[0].player_id, PlayerId(2));
        assert!(lineup.is_full());
    }

    #[test]
    fn lineup_can_end_short_of_eleven() {
        let mut fx = SquadFixture::standard(1);
        fx.set_minutes(3, 0)
            .set_minutes(8, 0)
            .set_minutes(2, 0)
            .set_minutes(7, 0)
            .set_minutes(12, 0);
        let lineup = resolve(&fx);
        assert_eq!(lineup.bench[3].decision, BenchDecision::Substituted);
        assert_eq!(lineup.counts.fwd, 3);
        assert_eq!(lineup.len(), 10);
    }

    #[test]
    fn eleventh_player_must_complete_a_legal_xi() {
        let mut fx = SquadFixture::standard(1);
        // Two defenders out, bench defender absent: 2 DEF can never reach 11.
        fx.set_minutes(3, 0).set_minutes(4, 0).set_minutes(7, 0);
        let lineup = resolve(&fx);
        assert_eq!(lineup.bench[0].decision, BenchDecision::FormationBlocked);
        assert_eq!(lineup.bench[2].decision, BenchDecision::Substituted);
        assert_eq!(lineup.bench[3].decision, BenchDecision::FormationBlocked);
        assert_eq!(lineup.len(), 10);
        assert_eq!(lineup.counts.shape(), "2-5-2");
    }
}
