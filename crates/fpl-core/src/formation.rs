//! Formation bounds and per-position tallies.
//!
//! The same bounds serve two checks: the validator's full starting-XI rule
//! and the substitution resolver's legality test on a growing active lineup.

use serde::{Deserialize, Serialize};

use crate::domain::{FormationSubject, Position, ValidationError, STARTING_XI};

/// Inclusive (min, max) bounds on a starting XI, per position.
pub const GK_BOUNDS: (usize, usize) = (1, 1);
pub const DEF_BOUNDS: (usize, usize) = (3, 5);
pub const MID_BOUNDS: (usize, usize) = (2, 5);
pub const FWD_BOUNDS: (usize, usize) = (1, 3);

/// Required squad make-up: 2 GK, 5 DEF, 5 MID, 3 FWD.
pub const SQUAD_QUOTA: PositionCounts = PositionCounts {
    gk: 2,
    def: 5,
    mid: 5,
    fwd: 3,
};

pub fn bounds(position: Position) -> (usize, usize) {
    match position {
        Position::GK => GK_BOUNDS,
        Position::DEF => DEF_BOUNDS,
        Position::MID => MID_BOUNDS,
        Position::FWD => FWD_BOUNDS,
    }
}

/// Number of players per position in some group.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionCounts {
    pub gk: usize,
    pub def: usize,
    pub mid: usize,
    pub fwd: usize,
}

impl PositionCounts {
    pub fn from_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        let mut counts = Self::default();
        for p in positions {
            counts.add(p);
        }
        counts
    }

    pub fn add(&mut self, position: Position) {
        *self.slot_mut(position) += 1;
    }

    pub fn get(&self, position: Position) -> usize {
        match position {
            Position::GK => self.gk,
            Position::DEF => self.def,
            Position::MID => self.mid,
            Position::FWD => self.fwd,
        }
    }

    pub fn total(&self) -> usize {
        self.gk + self.def + self.mid + self.fwd
    }

    /// Counts with one more player at `position`.
    pub fn with(mut self, position: Position) -> Self {
        self.add(position);
        self
    }

    fn slot_mut(&mut self, position: Position) -> &mut usize {
        match position {
            Position::GK => &mut self.gk,
            Position::DEF => &mut self.def,
            Position::MID => &mut self.mid,
            Position::FWD => &mut self.fwd,
        }
    }

    /// Full starting-XI check: exactly 11 players, every position in bounds.
    ///
    /// Reports the first bound broken, checking size, then GK, DEF, MID, FWD.
    pub fn check_starting_xi(&self) -> Result<(), ValidationError> {
        let total = self.total();
        if total != STARTING_XI {
            return Err(ValidationError::Formation {
                subject: FormationSubject::Starters,
                found: total,
                min: STARTING_XI,
                max: STARTING_XI,
            });
        }
        for position in Position::ALL {
            let (min, max) = bounds(position);
            let found = self.get(position);
            if found < min || found > max {
                return Err(ValidationError::Formation {
                    subject: FormationSubject::Position(position),
                    found,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Whether these counts can stand as an active lineup.
    ///
    /// Below 11 players only the maxima apply (at most one GK). At 11 the
    /// full starting-XI bounds apply. More than 11 is never legal.
    pub fn is_legal_active_lineup(&self) -> bool {
        let total = self.total();
        if total > STARTING_XI {
            return false;
        }
        if total == STARTING_XI {
            return self.check_starting_xi().is_ok();
        }
        Position::ALL
            .iter()
            .all(|&p| self.get(p) <= bounds(p).1)
    }

    /// Formation label such as `4-4-2` (outfield lines only).
    pub fn shape(&self) -> String {
        format!("{}-{}-{}", self.def, self.mid, self.fwd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(gk: usize, def: usize, mid: usize, fwd: usize) -> PositionCounts {
        PositionCounts { gk, def, mid, fwd }
    }

    #[test]
    fn standard_shapes_are_legal_xis() {
        for (d, m, f) in [(4, 4, 2), (3, 5, 2), (5, 4, 1), (3, 4, 3), (5, 2, 3)] {
            assert!(
                counts(1, d, m, f).check_starting_xi().is_ok(),
                "{}-{}-{} should be legal",
                d,
                m,
                f
            );
        }
    }

    #[test]
    fn first_broken_bound_is_reported() {
        let err = counts(1, 2, 5, 3).check_starting_xi().unwrap_err();
        assert_eq!(
            err,
            ValidationError::Formation {
                subject: FormationSubject::Position(Position::DEF),
                found: 2,
                min: 3,
                max: 5,
            }
        );

        let err = counts(1, 4, 4, 1).check_starting_xi().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Formation {
                subject: FormationSubject::Starters,
                found: 10,
                ..
            }
        ));
    }

    #[test]
    fn partial_lineup_only_checks_maxima() {
        // 9 players with only 2 DEF: fine while below 11.
        assert!(counts(1, 2, 4, 2).is_legal_active_lineup());
        // Second keeper is never allowed.
        assert!(!counts(2, 3, 3, 1).is_legal_active_lineup());
        // Fourth forward is never allowed.
        assert!(!counts(1, 3, 2, 4).is_legal_active_lineup());
        // No keeper below 11 is tolerated.
        assert!(counts(0, 4, 4, 2).is_legal_active_lineup());
    }

    #[test]
    fn full_lineup_needs_every_minimum() {
        assert!(counts(1, 3, 5, 2).is_legal_active_lineup());
        assert!(!counts(1, 2, 5, 3).is_legal_active_lineup());
        assert!(!counts(0, 5, 4, 2).is_legal_active_lineup());
        assert!(!counts(1, 4, 4, 3).is_legal_active_lineup());
    }

    #[test]
    fn shape_label() {
        assert_eq!(counts(1, 3, 5, 2).shape(), "3-5-2");
    }
}
