//! Optimizer output: per-gameweek role assignments for a whole season.
//!
//! The optimizer writes one object per gameweek label (`"gw1"`..`"gw38"`),
//! each holding binary player-keyed mappings for every known player:
//!
//! | key  | role                |
//! |------|---------------------|
//! | `x`  | starter             |
//! | `y`  | squad member        |
//! | `c`  | captain             |
//! | `v`  | vice-captain        |
//! | `b1`..`b4` | bench slot 1..4 |
//!
//! plus the `B_bank` and `f` scalars. Other keys (`y0`, `p0`, ...) are
//! optimizer bookkeeping and are ignored here.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FplError, PlayerId, Result, RoleAssignment};

/// Distance from 0 or 1 tolerated in solver output.
const BINARY_TOLERANCE: f64 = 1e-6;

/// Raw shape of one gameweek in the optimizer's JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OptimizerGameweek {
    x: BTreeMap<String, f64>,
    y: BTreeMap<String, f64>,
    c: BTreeMap<String, f64>,
    v: BTreeMap<String, f64>,
    b1: BTreeMap<String, f64>,
    b2: BTreeMap<String, f64>,
    b3: BTreeMap<String, f64>,
    b4: BTreeMap<String, f64>,
    #[serde(rename = "B_bank", default, skip_serializing_if = "Option::is_none")]
    bank: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    f: Option<f64>,
}

/// Every gameweek's role assignment, keyed by gameweek number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonPlan {
    gameweeks: BTreeMap<u32, RoleAssignment>,
}

impl SeasonPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the assignment for its gameweek.
    pub fn insert(&mut self, assignment: RoleAssignment) {
        self.gameweeks.insert(assignment.gameweek, assignment);
    }

    pub fn get(&self, gameweek: u32) -> Option<&RoleAssignment> {
        self.gameweeks.get(&gameweek)
    }

    pub fn get_mut(&mut self, gameweek: u32) -> Option<&mut RoleAssignment> {
        self.gameweeks.get_mut(&gameweek)
    }

    pub fn gameweeks(&self) -> impl Iterator<Item = &RoleAssignment> {
        self.gameweeks.values()
    }

    pub fn len(&self) -> usize {
        self.gameweeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gameweeks.is_empty()
    }

    /// Parse optimizer output JSON.
    ///
    /// # Errors
    ///
    /// - `FplError::Serialization`: not JSON, or a gameweek lacks a mapping.
    /// - `FplError::InvalidInput`: bad gameweek label, non-integer player key,
    ///   non-binary value, or mappings that disagree on the player universe.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, OptimizerGameweek> = serde_json::from_str(json)?;
        let mut plan = Self::new();
        for (label, gw) in raw {
            let gameweek = parse_label(&label)?;
            plan.insert(gw.into_assignment(gameweek)?);
        }
        tracing::debug!(gameweeks = plan.len(), "season plan parsed");
        Ok(plan)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Render back into the optimizer's JSON shape, with a 0/1 entry for every
    /// player in `universe` in every mapping.
    pub fn to_optimizer_json(&self, universe: &BTreeSet<PlayerId>) -> Result<serde_json::Value> {
        let mut out = serde_json::Map::new();
        for (gw, a) in &self.gameweeks {
            let raw = OptimizerGameweek {
                x: binary_map(universe, &a.starters),
                y: binary_map(universe, &a.squad),
                c: binary_map(universe, &a.captain),
                v: binary_map(universe, &a.vice_captain),
                b1: binary_map(universe, &a.bench[0]),
                b2: binary_map(universe, &a.bench[1]),
                b3: binary_map(universe, &a.bench[2]),
                b4: binary_map(universe, &a.bench[3]),
                bank: a.bank.map(|b| b as f64),
                f: a.free_transfers.map(|f| f as f64),
            };
            out.insert(format!("gw{}", gw), serde_json::to_value(raw)?);
        }
        Ok(serde_json::Value::Object(out))
    }
}

impl OptimizerGameweek {
    fn into_assignment(self, gameweek: u32) -> Result<RoleAssignment> {
        let universe: BTreeSet<&String> = self.y.keys().collect();
        let mappings = [
            ("x", &self.x),
            ("y", &self.y),
            ("c", &self.c),
            ("v", &self.v),
            ("b1", &self.b1),
            ("b2", &self.b2),
            ("b3", &self.b3),
            ("b4", &self.b4),
        ];
        for (name, map) in &mappings {
            if map.len() != universe.len() || !map.keys().all(|k| universe.contains(k)) {
                return Err(FplError::InvalidInput(format!(
                    "gw{}: mapping '{}' does not cover the same players as 'y'",
                    gameweek, name
                )));
            }
        }

        let members = |name: &str, map: &BTreeMap<String, f64>| -> Result<BTreeSet<PlayerId>> {
            let mut set = BTreeSet::new();
            for (key, &value) in map {
                let id = key.trim().parse::<u32>().map_err(|_| {
                    FplError::InvalidInput(format!(
                        "gw{}: mapping '{}' has non-integer player key '{}'",
                        gameweek, name, key
                    ))
                })?;
                if is_one(value) {
                    set.insert(PlayerId(id));
                } else if !is_zero(value) {
                    return Err(FplError::InvalidInput(format!(
                        "gw{}: mapping '{}' has non-binary value {} for player {}",
                        gameweek, name, value, id
                    )));
                }
            }
            Ok(set)
        };

        Ok(RoleAssignment {
            gameweek,
            squad: members("y", &self.y)?,
            starters: members("x", &self.x)?,
            captain: members("c", &self.c)?,
            vice_captain: members("v", &self.v)?,
            bench: [
                members("b1", &self.b1)?,
                members("b2", &self.b2)?,
                members("b3", &self.b3)?,
                members("b4", &self.b4)?,
            ],
            bank: integral(gameweek, "B_bank", self.bank)?,
            free_transfers: integral(gameweek, "f", self.f)?,
        })
    }
}

/// Parse a `gw<N>` label into `N` (N >= 1).
pub fn parse_label(label: &str) -> Result<u32> {
    label
        .strip_prefix("gw")
        .and_then(|n| n.parse::<u32>().ok())
        .filter(|&n| n >= 1)
        .ok_or_else(|| FplError::InvalidInput(format!("bad gameweek label '{}'", label)))
}

fn is_one(value: f64) -> bool {
    (value - 1.0).abs() < BINARY_TOLERANCE
}

fn is_zero(value: f64) -> bool {
    value.abs() < BINARY_TOLERANCE
}

fn integral(gameweek: u32, name: &str, value: Option<f64>) -> Result<Option<i64>> {
    match value {
        None => Ok(None),
        Some(v) if (v - v.round()).abs() < BINARY_TOLERANCE => Ok(Some(v.round() as i64)),
        Some(v) => Err(FplError::InvalidInput(format!(
            "gw{}: '{}' must be an integer, found {}",
            gameweek, name, v
        ))),
    }
}

fn binary_map(universe: &BTreeSet<PlayerId>, members: &BTreeSet<PlayerId>) -> BTreeMap<String, f64> {
    universe
        .iter()
        .map(|id| {
            let flag = if members.contains(id) { 1.0 } else { 0.0 };
            (id.to_string(), flag)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gameweek_json(value: serde_json::Value) -> serde_json::Value {
        let all = |on: &[&str]| {
            let mut m = serde_json::Map::new();
            for id in ["1", "2", "3"] {
                m.insert(id.to_string(), json!(if on.contains(&id) { 1 } else { 0 }));
            }
            serde_json::Value::Object(m)
        };
        let mut gw = json!({
            "x": all(&["1"]), "y": all(&["1", "2"]), "c": all(&["1"]), "v": all(&[]),
            "b1": all(&["2"]), "b2": all(&[]), "b3": all(&[]), "b4": all(&[]),
            "y0": all(&[]), "p0": {"1": 45, "2": 50, "3": 40},
            "B_bank": 5, "f": 1
        });
        if let serde_json::Value::Object(overrides) = value {
            for (k, v) in overrides {
                gw[k] = v;
            }
        }
        gw
    }

    #[test]
    fn parses_role_sets_and_scalars() {
        let doc = json!({ "gw3": gameweek_json(json!({})) });
        let plan = SeasonPlan::from_json_str(&doc.to_string()).expect("parse");
        let a = plan.get(3).expect("gw3");
        assert_eq!(a.squad, BTreeSet::from([PlayerId(1), PlayerId(2)]));
        assert_eq!(a.starters, BTreeSet::from([PlayerId(1)]));
        assert_eq!(a.bench[0], BTreeSet::from([PlayerId(2)]));
        assert!(a.vice_captain.is_empty());
        assert_eq!(a.bank, Some(5));
        assert_eq!(a.free_transfers, Some(1));
    }

    #[test]
    fn accepts_float_solver_values() {
        let doc = json!({ "gw1": gameweek_json(json!({
            "x": {"1": 0.9999999, "2": 0.0, "3": 1e-9}
        })) });
        let plan = SeasonPlan::from_json_str(&doc.to_string()).expect("parse");
        assert_eq!(plan.get(1).expect("gw1").starters, BTreeSet::from([PlayerId(1)]));
    }

    #[test]
    fn rejects_non_binary_values() {
        let doc = json!({ "gw1": gameweek_json(json!({
            "c": {"1": 0.5, "2": 0, "3": 0}
        })) });
        let err = SeasonPlan::from_json_str(&doc.to_string()).unwrap_err();
        assert!(matches!(err, FplError::InvalidInput(ref m) if m.contains("non-binary")));
    }

    #[test]
    fn rejects_mappings_over_different_players() {
        let doc = json!({ "gw1": gameweek_json(json!({
            "b4": {"1": 0, "2": 0}
        })) });
        let err = SeasonPlan::from_json_str(&doc.to_string()).unwrap_err();
        assert!(matches!(err, FplError::InvalidInput(ref m) if m.contains("'b4'")));
    }

    #[test]
    fn rejects_bad_labels() {
        assert_eq!(parse_label("gw38").expect("label"), 38);
        assert!(parse_label("gw0").is_err());
        assert!(parse_label("week1").is_err());
        assert!(parse_label("gw").is_err());
    }

    #[test]
    fn optimizer_json_round_trips_roles() {
        let doc = json!({ "gw2": gameweek_json(json!({})) });
        let plan = SeasonPlan::from_json_str(&doc.to_string()).expect("parse");
        let universe = BTreeSet::from([PlayerId(1), PlayerId(2), PlayerId(3)]);
        let rendered = plan.to_optimizer_json(&universe).expect("render");
        assert_eq!(rendered["gw2"]["y"]["3"], json!(0.0));
        let reparsed = SeasonPlan::from_json_str(&rendered.to_string()).expect("reparse");
        assert_eq!(reparsed, plan);
    }
}
