//! Squad changes between consecutive simulated gameweeks.
//!
//! The first simulated gameweek has no previous squad. Its 15 players are
//! reported as the initial squad and count as zero transfers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, PlayerIdentity, Result};
use crate::stats::StatsTable;

/// Bare set difference between two squads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquadDiff {
    pub players_in: Vec<PlayerId>,
    pub players_out: Vec<PlayerId>,
}

impl SquadDiff {
    pub fn between(previous: &BTreeSet<PlayerId>, current: &BTreeSet<PlayerId>) -> Self {
        Self {
            players_in: current.difference(previous).copied().collect(),
            players_out: previous.difference(current).copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferSummary {
    /// First simulated gameweek: the squad as picked, not transfers.
    InitialSquad { players: Vec<PlayerIdentity> },
    Transfers {
        players_in: Vec<PlayerIdentity>,
        players_out: Vec<PlayerIdentity>,
    },
}

impl TransferSummary {
    /// Transfers made, one per player sold.
    pub fn count(&self) -> usize {
        match self {
            TransferSummary::InitialSquad { .. } => 0,
            TransferSummary::Transfers { players_out, .. } => players_out.len(),
        }
    }

    pub fn is_initial(&self) -> bool {
        matches!(self, TransferSummary::InitialSquad { .. })
    }

    pub fn players_in(&self) -> &[PlayerIdentity] {
        match self {
            TransferSummary::InitialSquad { players } => players,
            TransferSummary::Transfers { players_in, .. } => players_in,
        }
    }

    pub fn players_out(&self) -> &[PlayerIdentity] {
        match self {
            TransferSummary::InitialSquad { .. } => &[],
            TransferSummary::Transfers { players_out, .. } => players_out,
        }
    }
}

/// Diff `current` against `previous` and resolve every player involved.
///
/// Players sold this gameweek may have no row in it; they are resolved from
/// the latest earlier gameweek that has one.
pub fn diff_squads(
    previous: Option<&BTreeSet<PlayerId>>,
    current: &BTreeSet<PlayerId>,
    gameweek: u32,
    stats: &StatsTable,
) -> Result<TransferSummary> {
    let resolve = |ids: &[PlayerId]| -> Result<Vec<PlayerIdentity>> {
        ids.iter().map(|&id| stats.identity(gameweek, id)).collect()
    };

    match previous {
        None => {
            let players: Vec<PlayerId> = current.iter().copied().collect();
            Ok(TransferSummary::InitialSquad {
                players: resolve(&players)?,
            })
        }
        Some(previous) => {
            let diff = SquadDiff::between(previous, current);
            Ok(TransferSummary::Transfers {
                players_in: resolve(&diff.players_in)?,
                players_out: resolve(&diff.players_out)?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{gameweek_records, SeasonFixture};

    #[test]
    fn set_difference_both_ways() {
        let prev: BTreeSet<_> = [1, 2, 3].into_iter().map(PlayerId).collect();
        let curr: BTreeSet<_> = [2, 3, 4].into_iter().map(PlayerId).collect();
        let diff = SquadDiff::between(&prev, &curr);
        assert_eq!(diff.players_in, vec![PlayerId(4)]);
        assert_eq!(diff.players_out, vec![PlayerId(1)]);
    }

    #[test]
    fn first_gameweek_is_initial_squad() {
        let fx = SeasonFixture::new(1);
        let squad = &fx.plan.get(1).expect("gw1").squad;
        let summary = diff_squads(None, squad, 1, &fx.stats).expect("diff");
        assert!(summary.is_initial());
        assert_eq!(summary.players_in().len(), 15);
        assert_eq!(summary.count(), 0);
    }

    #[test]
    fn sold_player_resolved_from_earlier_gameweek() {
        let mut fx = SeasonFixture::new(2);
        fx.transfer(2, 15, 104);
        // Player 15 has no gw2 row once sold.
        fx.stats = StatsTable::from_records(
            gameweek_records(1).into_iter().chain(
                gameweek_records(2)
                    .into_iter()
                    .filter(|r| r.player_id != PlayerId(15)),
            ),
        )
        .expect("table");

        let prev = fx.plan.get(1).expect("gw1").squad.clone();
        let curr = fx.plan.get(2).expect("gw2").squad.clone();
        let summary = diff_squads(Some(&prev), &curr, 2, &fx.stats).expect("diff");
        assert_eq!(summary.count(), 1);
        assert_eq!(summary.players_out()[0].name, "Player 15");
        assert_eq!(summary.players_in()[0].team, "Reserve FC");
    }
}
