//! Automatic substitution cascade.

use fpl_core::fixtures::SquadFixture;
use fpl_core::{
    resolve_active_lineup, validate_selection, ActiveLineup, BenchDecision, PlayerId,
    ValidatedSelection,
};

fn selection(fx: &SquadFixture) -> ValidatedSelection {
    validate_selection(&fx.assignment, fx.stats.gameweek(fx.gameweek())).expect("valid")
}

fn resolve(fx: &SquadFixture, selection: &ValidatedSelection) -> ActiveLineup {
    resolve_active_lineup(selection, fx.stats.gameweek(fx.gameweek())).expect("resolve")
}

#[test]
fn everyone_played_keeps_the_starters() {
    let fx = SquadFixture::standard(1);
    let sel = selection(&fx);
    let lineup = resolve(&fx, &sel);
    let active: std::collections::BTreeSet<_> = lineup.players.iter().copied().collect();
    assert_eq!(active, sel.starters);
    assert!(lineup.substitutions.is_empty());
}

#[test]
fn two_absent_defenders_cascade_into_three_five_two() {
    let mut fx = SquadFixture::standard(1);
    fx.set_minutes(3, 0)
        .set_minutes(4, 0)
        .set_minutes(2, 0)
        .set_minutes(15, 0);
    let sel = selection(&fx);
    let lineup = resolve(&fx, &sel);

    assert_eq!(lineup.len(), 11);
    assert_eq!(lineup.counts.shape(), "3-5-2");
    let slots: Vec<u8> = lineup.substitutions.iter().map(|s| s.slot).collect();
    assert_eq!(slots, vec![2, 3]);
    assert_eq!(lineup.substitutions[0].player_id, PlayerId(7));
    assert_eq!(lineup.substitutions[1].player_id, PlayerId(12));
    assert_eq!(lineup.bench[0].decision, BenchDecision::DidNotPlay);
    assert_eq!(lineup.bench[3].decision, BenchDecision::NotNeeded);
}

#[test]
fn bench_keeper_only_comes_on_for_absent_keeper() {
    let mut fx = SquadFixture::standard(1);
    fx.set_minutes(13, 0);
    let sel = selection(&fx);
    let lineup = resolve(&fx, &sel);
    assert_eq!(lineup.bench[0].decision, BenchDecision::FormationBlocked);
    assert_eq!(lineup.counts.gk, 1);

    fx.set_minutes(13, 90).set_minutes(1, 0);
    let lineup = resolve(&fx, &sel);
    assert_eq!(lineup.bench[0].decision, BenchDecision::Substituted);
    assert!(lineup.contains(PlayerId(2)));
    assert!(!lineup.contains(PlayerId(1)));
}

#[test]
fn nobody_playing_leaves_an_empty_lineup() {
    let mut fx = SquadFixture::standard(1);
    for id in 1..=15 {
        fx.set_minutes(id, 0);
    }
    let sel = selection(&fx);
    let lineup = resolve(&fx, &sel);
    assert!(lineup.is_empty());
    assert!(lineup
        .bench
        .iter()
        .all(|b| b.decision == BenchDecision::DidNotPlay));
}

/// Every attendance pattern for the 15-man squad.
#[test]
fn lineup_bounds_hold_for_every_attendance_pattern() {
    let mut fx = SquadFixture::standard(1);
    let sel = selection(&fx);
    for mask in 0u32..(1 << 15) {
        for id in 1..=15u32 {
            let absent = mask & (1 << (id - 1)) != 0;
            fx.set_minutes(id, if absent { 0 } else { 90 });
        }
        let lineup = resolve(&fx, &sel);
        let played_starters = sel
            .starters
            .iter()
            .filter(|id| mask & (1 << (id.0 - 1)) == 0)
            .count();

        assert!(lineup.len() <= 11, "mask {:#b}", mask);
        assert!(lineup.len() >= played_starters, "mask {:#b}", mask);
        assert!(lineup.counts.gk <= 1, "mask {:#b}", mask);
        if lineup.is_full() {
            assert!(lineup.counts.check_starting_xi().is_ok(), "mask {:#b}", mask);
        }
        assert_eq!(lineup.len(), played_starters + lineup.substitutions.len());

        let again = resolve(&fx, &sel);
        assert_eq!(again, lineup, "resolution is not idempotent for {:#b}", mask);
    }
}
