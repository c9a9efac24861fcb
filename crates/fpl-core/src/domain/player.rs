//! Player identity and per-gameweek stats rows.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier of a player across the whole season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl PlayerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playing position as listed by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    GK,
    DEF,
    MID,
    FWD,
}

impl Position {
    /// All positions in lineup display order.
    pub const ALL: [Position; 4] = [Position::GK, Position::DEF, Position::MID, Position::FWD];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::GK => "GK",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        }
    }

    pub fn is_goalkeeper(&self) -> bool {
        matches!(self, Position::GK)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the stats table: a player's realized data for one gameweek.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub gw: u32,
    pub name: String,
    pub position: Position,
    pub team: String,
    /// Price in tenths of a currency unit.
    pub cost: i32,
    /// Realized points.
    pub points: i32,
    /// Forecast points. Carried through, never read by the engine.
    #[serde(rename = "eP", default)]
    pub ep: f64,
    #[serde(default)]
    pub prob_showup: Option<f64>,
    pub minutes: u32,
    #[serde(deserialize_with = "deserialize_flag", default)]
    pub unavailable: bool,
}

impl PlayerRecord {
    pub fn played(&self) -> bool {
        self.minutes > 0
    }

    pub fn identity(&self) -> PlayerIdentity {
        PlayerIdentity {
            player_id: self.player_id,
            name: self.name.clone(),
            position: self.position,
            team: self.team.clone(),
        }
    }
}

/// Presentation identity of a player (who, where, which club).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub player_id: PlayerId,
    pub name: String,
    pub position: Position,
    pub team: String,
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ID: {}, {}, {})",
            self.name, self.player_id, self.position, self.team
        )
    }
}

/// Accepts `0`/`1` as well as `true`/`false` for boolean columns.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Float(f) if f == 0.0 => Ok(false),
        Flag::Float(f) if f == 1.0 => Ok(true),
        Flag::Text(t) if t.trim().is_empty() => Ok(false),
        Flag::Text(t) if t.trim().eq_ignore_ascii_case("true") => Ok(true),
        Flag::Text(t) if t.trim().eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(serde::de::Error::custom("expected a 0/1 flag")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_serializes_as_short_code() {
        let json = serde_json::to_string(&Position::MID).expect("serialize");
        assert_eq!(json, "\"MID\"");
        let parsed: Position = serde_json::from_str("\"FWD\"").expect("parse");
        assert_eq!(parsed, Position::FWD);
    }

    #[test]
    fn player_id_is_transparent() {
        let json = serde_json::to_string(&PlayerId(42)).expect("serialize");
        assert_eq!(json, "42");
    }

    #[test]
    fn unavailable_flag_accepts_numeric_and_bool() {
        let base = serde_json::json!({
            "player_id": 1, "gw": 1, "name": "A", "position": "GK", "team": "T",
            "cost": 45, "points": 2, "eP": 3.1, "minutes": 90, "unavailable": 1
        });
        let rec: PlayerRecord = serde_json::from_value(base.clone()).expect("numeric flag");
        assert!(rec.unavailable);

        let mut as_bool = base;
        as_bool["unavailable"] = serde_json::json!(false);
        let rec: PlayerRecord = serde_json::from_value(as_bool).expect("bool flag");
        assert!(!rec.unavailable);
    }

    #[test]
    fn identity_display_includes_club() {
        let id = PlayerIdentity {
            player_id: PlayerId(7),
            name: "Saka".to_string(),
            position: Position::MID,
            team: "Arsenal".to_string(),
        };
        assert_eq!(id.to_string(), "Saka (ID: 7, MID, Arsenal)");
    }
}
