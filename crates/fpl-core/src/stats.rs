//! Realized per-player, per-gameweek statistics.
//!
//! The table is loaded once from CSV and stays immutable for the whole run.
//! Lookups that miss produce [`FplError::MissingPlayerData`] naming the
//! `(player_id, gameweek)` pair.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use crate::domain::{FplError, PlayerId, PlayerIdentity, PlayerRecord, Result};

/// All stats rows for a single gameweek.
#[derive(Debug, Clone, Default)]
pub struct GameweekStats {
    gameweek: u32,
    players: HashMap<PlayerId, PlayerRecord>,
}

impl GameweekStats {
    pub fn new(gameweek: u32) -> Self {
        Self {
            gameweek,
            players: HashMap::new(),
        }
    }

    pub fn gameweek(&self) -> u32 {
        self.gameweek
    }

    /// Insert a row. Rejects a second row for the same player.
    pub fn insert(&mut self, record: PlayerRecord) -> Result<()> {
        if self.players.contains_key(&record.player_id) {
            return Err(FplError::DuplicateRow {
                player_id: record.player_id,
                gameweek: self.gameweek,
            });
        }
        self.players.insert(record.player_id, record);
        Ok(())
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(&player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// The full season stats table, keyed by gameweek.
#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    gameweeks: BTreeMap<u32, GameweekStats>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, rejecting duplicate `(player_id, gw)` pairs.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = PlayerRecord>,
    {
        let mut table = Self::new();
        for record in records {
            table.insert(record)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, record: PlayerRecord) -> Result<()> {
        let gw = record.gw;
        self.gameweeks
            .entry(gw)
            .or_insert_with(|| GameweekStats::new(gw))
            .insert(record)
    }

    /// Load the table from CSV with a header row. Extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::new();
        for row in csv_reader.deserialize::<PlayerRecord>() {
            table.insert(row?)?;
        }
        tracing::debug!(
            gameweeks = table.gameweeks.len(),
            rows = table.row_count(),
            "stats table loaded"
        );
        Ok(table)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Stats for one gameweek. A gameweek with no rows yields an empty view,
    /// so every lookup in it reports missing player data.
    pub fn gameweek(&self, gameweek: u32) -> GameweekView<'_> {
        GameweekView {
            gameweek,
            stats: self.gameweeks.get(&gameweek),
        }
    }

    /// Resolve who a player is, as seen in `gameweek` or, failing that, the
    /// latest earlier gameweek that has a row for them.
    pub fn identity(&self, gameweek: u32, player_id: PlayerId) -> Result<PlayerIdentity> {
        self.gameweeks
            .range(..=gameweek)
            .rev()
            .find_map(|(_, stats)| stats.get(player_id))
            .map(PlayerRecord::identity)
            .ok_or(FplError::MissingPlayerData {
                player_id,
                gameweek,
            })
    }

    /// Mutable access to one row, for building scenarios.
    pub fn record_mut(&mut self, gameweek: u32, player_id: PlayerId) -> Option<&mut PlayerRecord> {
        self.gameweeks
            .get_mut(&gameweek)
            .and_then(|stats| stats.players.get_mut(&player_id))
    }

    pub fn gameweek_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.gameweeks.keys().copied()
    }

    pub fn row_count(&self) -> usize {
        self.gameweeks.values().map(GameweekStats::len).sum()
    }
}

/// Borrowed view over one gameweek of the stats table.
#[derive(Debug, Clone, Copy)]
pub struct GameweekView<'a> {
    gameweek: u32,
    stats: Option<&'a GameweekStats>,
}

impl<'a> GameweekView<'a> {
    pub fn gameweek(&self) -> u32 {
        self.gameweek
    }

    pub fn player(&self, player_id: PlayerId) -> Result<&'a PlayerRecord> {
        self.stats
            .and_then(|s| s.get(player_id))
            .ok_or(FplError::MissingPlayerData {
                player_id,
                gameweek: self.gameweek,
            })
    }
}
