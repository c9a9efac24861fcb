//! Gameweek score with captaincy doubling.

use serde::{Deserialize, Serialize};

use crate::domain::{PlayerId, Result};
use crate::stats::GameweekView;
use crate::substitution::ActiveLineup;

/// Which armband a player wears.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Armband {
    Captain,
    ViceCaptain,
}

impl Armband {
    pub fn as_str(&self) -> &'static str {
        match self {
            Armband::Captain => "captain",
            Armband::ViceCaptain => "vice_captain",
        }
    }
}

/// Who, if anyone, had their points doubled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptaincyOutcome {
    pub doubled: Option<Armband>,
    pub player_id: Option<PlayerId>,
    /// Extra points from the doubling (the doubled player's raw points).
    pub bonus: i32,
}

impl CaptaincyOutcome {
    pub fn none() -> Self {
        Self {
            doubled: None,
            player_id: None,
            bonus: 0,
        }
    }

    /// `captain`, `vice_captain` or `none`.
    pub fn label(&self) -> &'static str {
        self.doubled.map(|a| a.as_str()).unwrap_or("none")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameweekScore {
    /// Raw points of the active lineup.
    pub base: i32,
    pub captaincy: CaptaincyOutcome,
    /// `base + captaincy.bonus`.
    pub total: i32,
}

/// Score the active lineup.
///
/// The captain's points count twice if they are active; otherwise the
/// vice-captain's do if they are active; otherwise nobody's.
pub fn compute_score(
    lineup: &ActiveLineup,
    captain: PlayerId,
    vice_captain: PlayerId,
    stats: GameweekView<'_>,
) -> Result<GameweekScore> {
    let mut base = 0;
    for &id in &lineup.players {
        base += stats.player(id)?.points;
    }

    let doubled = if lineup.contains(captain) {
        Some((Armband::Captain, captain))
    } else if lineup.contains(vice_captain) {
        Some((Armband::ViceCaptain, vice_captain))
    } else {
        None
    };

    let captaincy = match doubled {
        Some((armband, id)) => CaptaincyOutcome {
            doubled: Some(armband),
            player_id: Some(id),
            bonus: stats.player(id)?.points,
        },
        None => CaptaincyOutcome::none(),
    };

    Ok(GameweekScore {
        base,
        captaincy,
        total: base + captaincy.bonus,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SquadFixture;
    use crate::substitution::resolve_active_lineup;
    use crate::validator::validate_selection;

    fn score(fx: &SquadFixture) -> GameweekScore {
        let view = fx.stats.gameweek(fx.gameweek());
        let selection = validate_selection(&fx.assignment, view).expect("valid");
        let lineup = resolve_active_lineup(&selection, view).expect("lineup");
        compute_score(&lineup, selection.captain, selection.vice_captain, view).expect("score")
    }

    #[test]
    fn captain_doubled_when_active() {
        let fx = SquadFixture::standard(1);
        let s = score(&fx);
        // Starters 1,3-6,8-11,13-14 score their ids.
        assert_eq!(s.base, 1 + 3 + 4 + 5 + 6 + 8 + 9 + 10 + 11 + 13 + 14);
        assert_eq!(s.captaincy.doubled, Some(Armband::Captain));
        assert_eq!(s.captaincy.bonus, 10);
        assert_eq!(s.total, s.base + 10);
    }

    #[test]
    fn negative_captain_points_are_doubled_too() {
        let mut fx = SquadFixture::standard(1);
        fx.set_points(10, -2);
        let s = score(&fx);
        assert_eq!(s.captaincy.bonus, -2);
        assert_eq!(s.total, s.base - 2);
    }

    #[test]
    fn label_names_the_armband() {
        assert_eq!(CaptaincyOutcome::none().label(), "none");
        let vc = CaptaincyOutcome {
            doubled: Some(Armband::ViceCaptain),
            player_id: Some(PlayerId(3)),
            bonus: 4,
        };
        assert_eq!(vc.label(), "vice_captain");
    }
}
