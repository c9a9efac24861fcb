//! In-memory squads and stats tables for tests.
//!
//! The standard squad is a legal 4-4-2 with every player on 90 minutes and
//! scoring points equal to their id:
//!
//! | ids     | position | role                  |
//! |---------|----------|-----------------------|
//! | 1       | GK       | starter               |
//! | 2       | GK       | bench slot 1          |
//! | 3-6     | DEF      | starters              |
//! | 7       | DEF      | bench slot 2          |
//! | 8-11    | MID      | starters (10 captain) |
//! | 12      | MID      | bench slot 3          |
//! | 13-14   | FWD      | starters (13 vice)    |
//! | 15      | FWD      | bench slot 4          |
//!
//! Clubs are `Club0`..`Club4`, three players each. Reserves 101 (GK),
//! 102 (DEF), 103 (MID) and 104 (FWD) play for `Reserve FC` and are outside
//! the squad, ready to be transferred in.

use std::collections::BTreeSet;

use crate::domain::{PlayerId, PlayerRecord, Position, RoleAssignment};
use crate::plan::SeasonPlan;
use crate::stats::StatsTable;

pub const CAPTAIN: PlayerId = PlayerId(10);
pub const VICE_CAPTAIN: PlayerId = PlayerId(13);
pub const BENCH: [PlayerId; 4] = [PlayerId(2), PlayerId(7), PlayerId(12), PlayerId(15)];
pub const RESERVES: [(PlayerId, Position); 4] = [
    (PlayerId(101), Position::GK),
    (PlayerId(102), Position::DEF),
    (PlayerId(103), Position::MID),
    (PlayerId(104), Position::FWD),
];

/// Position of a standard-squad player.
pub fn squad_position(id: u32) -> Position {
    match id {
        1..=2 => Position::GK,
        3..=7 => Position::DEF,
        8..=12 => Position::MID,
        _ => Position::FWD,
    }
}

/// A stats row with 90 minutes played.
pub fn record(id: u32, gw: u32, position: Position, team: &str, points: i32) -> PlayerRecord {
    PlayerRecord {
        player_id: PlayerId(id),
        gw,
        name: format!("Player {}", id),
        position,
        team: team.to_string(),
        cost: 50,
        points,
        ep: 0.0,
        prob_showup: None,
        minutes: 90,
        unavailable: false,
    }
}

/// Stats rows for every standard-squad player and every reserve in `gw`.
pub fn gameweek_records(gw: u32) -> Vec<PlayerRecord> {
    let squad = (1..=15).map(|id| {
        let team = format!("Club{}", (id - 1) / 3);
        record(id, gw, squad_position(id), &team, id as i32)
    });
    let reserves = RESERVES
        .iter()
        .map(|&(id, pos)| record(id.0, gw, pos, "Reserve FC", 1));
    squad.chain(reserves).collect()
}

/// The standard 4-4-2 role assignment for `gw`.
pub fn standard_assignment(gw: u32) -> RoleAssignment {
    let mut a = RoleAssignment::new(gw);
    a.squad = (1..=15).map(PlayerId).collect();
    a.starters = a
        .squad
        .iter()
        .copied()
        .filter(|id| !BENCH.contains(id))
        .collect();
    a.captain = BTreeSet::from([CAPTAIN]);
    a.vice_captain = BTreeSet::from([VICE_CAPTAIN]);
    for (slot, id) in BENCH.iter().enumerate() {
        a.bench[slot] = BTreeSet::from([*id]);
    }
    a.bank = Some(0);
    a.free_transfers = Some(1);
    a
}

/// Every player id the fixtures know about.
pub fn universe() -> BTreeSet<PlayerId> {
    (1..=15)
        .map(PlayerId)
        .chain(RESERVES.iter().map(|(id, _)| *id))
        .collect()
}

/// One gameweek: a role assignment plus the stats it is judged against.
#[derive(Debug, Clone)]
pub struct SquadFixture {
    pub assignment: RoleAssignment,
    pub stats: StatsTable,
}

impl SquadFixture {
    pub fn standard(gw: u32) -> Self {
        let mut stats = StatsTable::new();
        for row in gameweek_records(gw) {
            // Fresh table, ids are unique.
            let _ = stats.insert(row);
        }
        Self {
            assignment: standard_assignment(gw),
            stats,
        }
    }

    pub fn gameweek(&self) -> u32 {
        self.assignment.gameweek
    }

    pub fn captain(&self) -> PlayerId {
        CAPTAIN
    }

    pub fn vice_captain(&self) -> PlayerId {
        VICE_CAPTAIN
    }

    pub fn bench(&self) -> [PlayerId; 4] {
        BENCH
    }

    pub fn starters(&self) -> BTreeSet<PlayerId> {
        self.assignment.starters.clone()
    }

    pub fn set_minutes(&mut self, id: u32, minutes: u32) -> &mut Self {
        let gw = self.gameweek();
        if let Some(row) = self.stats.record_mut(gw, PlayerId(id)) {
            row.minutes = minutes;
        }
        self
    }

    pub fn set_points(&mut self, id: u32, points: i32) -> &mut Self {
        let gw = self.gameweek();
        if let Some(row) = self.stats.record_mut(gw, PlayerId(id)) {
            row.points = points;
        }
        self
    }

    pub fn set_team(&mut self, id: u32, team: &str) -> &mut Self {
        let gw = self.gameweek();
        if let Some(row) = self.stats.record_mut(gw, PlayerId(id)) {
            row.team = team.to_string();
        }
        self
    }

    pub fn set_position(&mut self, id: u32, position: Position) -> &mut Self {
        let gw = self.gameweek();
        if let Some(row) = self.stats.record_mut(gw, PlayerId(id)) {
            row.position = position;
        }
        self
    }
}

/// A run of consecutive standard gameweeks `1..=n`.
#[derive(Debug, Clone)]
pub struct SeasonFixture {
    pub plan: SeasonPlan,
    pub stats: StatsTable,
}

impl SeasonFixture {
    pub fn new(gameweeks: u32) -> Self {
        let mut plan = SeasonPlan::new();
        let mut stats = StatsTable::new();
        for gw in 1..=gameweeks {
            plan.insert(standard_assignment(gw));
            for row in gameweek_records(gw) {
                let _ = stats.insert(row);
            }
        }
        Self { plan, stats }
    }

    pub fn assignment_mut(&mut self, gw: u32) -> Option<&mut RoleAssignment> {
        self.plan.get_mut(gw)
    }

    /// Swap `out` for `incoming` from gameweek `from_gw` onwards, keeping
    /// whatever role `out` held.
    pub fn transfer(&mut self, from_gw: u32, out: u32, incoming: u32) -> &mut Self {
        let (out, incoming) = (PlayerId(out), PlayerId(incoming));
        let gameweeks: Vec<u32> = self
            .plan
            .gameweeks()
            .map(|a| a.gameweek)
            .filter(|&gw| gw >= from_gw)
            .collect();
        for gw in gameweeks {
            if let Some(a) = self.plan.get_mut(gw) {
                let sets = std::iter::once(&mut a.squad)
                    .chain(std::iter::once(&mut a.starters))
                    .chain(std::iter::once(&mut a.captain))
                    .chain(std::iter::once(&mut a.vice_captain))
                    .chain(a.bench.iter_mut());
                for set in sets {
                    if set.remove(&out) {
                        set.insert(incoming);
                    }
                }
            }
        }
        self
    }

    pub fn set_minutes(&mut self, gw: u32, id: u32, minutes: u32) -> &mut Self {
        if let Some(row) = self.stats.record_mut(gw, PlayerId(id)) {
            row.minutes = minutes;
        }
        self
    }

    pub fn set_points(&mut self, gw: u32, id: u32, points: i32) -> &mut Self {
        if let Some(row) = self.stats.record_mut(gw, PlayerId(id)) {
            row.points = points;
        }
        self
    }
}
