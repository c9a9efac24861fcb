use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::domain::{FplError, Result};

/// Gameweeks in a regular season.
pub const SEASON_GAMEWEEKS: u32 = 38;

/// Settings for one season backtest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BacktestConfig {
    pub first_gameweek: u32,
    pub last_gameweek: u32,
    /// Validate every gameweek in parallel before simulating.
    pub prevalidate: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            first_gameweek: 1,
            last_gameweek: SEASON_GAMEWEEKS,
            prevalidate: false,
        }
    }
}

impl BacktestConfig {
    pub fn with_range(mut self, first: u32, last: u32) -> Self {
        self.first_gameweek = first;
        self.last_gameweek = last;
        self
    }

    pub fn with_prevalidate(mut self, prevalidate: bool) -> Self {
        self.prevalidate = prevalidate;
        self
    }

    pub fn gameweeks(&self) -> RangeInclusive<u32> {
        self.first_gameweek..=self.last_gameweek
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_gameweek == 0 || self.first_gameweek > self.last_gameweek {
            return Err(FplError::InvalidInput(format!(
                "gameweek range {}..={} is empty or starts at 0",
                self.first_gameweek, self.last_gameweek
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_full_season() {
        let cfg = BacktestConfig::default();
        assert_eq!(cfg.gameweeks().count(), 38);
        assert!(!cfg.prevalidate);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: BacktestConfig = serde_json::from_str(r#"{"last_gameweek": 10}"#).expect("parse");
        assert_eq!(cfg.first_gameweek, 1);
        assert_eq!(cfg.last_gameweek, 10);
    }

    #[test]
    fn empty_range_is_rejected() {
        assert!(BacktestConfig::default().with_range(5, 4).validate().is_err());
        assert!(BacktestConfig::default().with_range(0, 4).validate().is_err());
    }
}
