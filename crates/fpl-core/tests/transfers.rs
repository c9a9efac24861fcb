//! Squad diffs between consecutive gameweeks.

use fpl_core::fixtures::SeasonFixture;
use fpl_core::{diff_squads, validate_selection, PlayerId, SquadDiff, TransferSummary};

fn squad(fx: &SeasonFixture, gw: u32) -> std::collections::BTreeSet<PlayerId> {
    fx.plan.get(gw).expect("planned").squad.clone()
}

#[test]
fn in_and_out_balance_for_valid_consecutive_squads() {
    let mut fx = SeasonFixture::new(4);
    fx.transfer(2, 15, 104)
        .transfer(3, 7, 102)
        .transfer(3, 12, 103)
        .transfer(4, 102, 7);

    for gw in 1..=4 {
        let a = fx.plan.get(gw).expect("planned");
        validate_selection(a, fx.stats.gameweek(gw)).expect("valid squad");
    }

    let expected = [(2, 1), (3, 2), (4, 1)];
    for (gw, count) in expected {
        let diff = SquadDiff::between(&squad(&fx, gw - 1), &squad(&fx, gw));
        assert_eq!(diff.players_in.len(), diff.players_out.len());
        let summary =
            diff_squads(Some(&squad(&fx, gw - 1)), &squad(&fx, gw), gw, &fx.stats).expect("diff");
        assert_eq!(summary.count(), count, "gw{}", gw);
        assert_eq!(summary.players_in().len(), summary.players_out().len());
    }
}

#[test]
fn transfers_carry_identity() {
    let mut fx = SeasonFixture::new(2);
    fx.transfer(2, 7, 102);
    let summary = diff_squads(Some(&squad(&fx, 1)), &squad(&fx, 2), 2, &fx.stats).expect("diff");
    match summary {
        TransferSummary::Transfers {
            players_in,
            players_out,
        } => {
            assert_eq!(players_in[0].player_id, PlayerId(102));
            assert_eq!(players_in[0].team, "Reserve FC");
            assert_eq!(players_out[0].player_id, PlayerId(7));
            assert_eq!(players_out[0].team, "Club2");
        }
        other => panic!("Expected Transfers, got {:?}", other),
    }
}

#[test]
fn unchanged_squad_has_no_transfers() {
    let fx = SeasonFixture::new(2);
    let summary = diff_squads(Some(&squad(&fx, 1)), &squad(&fx, 2), 2, &fx.stats).expect("diff");
    assert_eq!(summary.count(), 0);
    assert!(!summary.is_initial());
    assert!(summary.players_in().is_empty());
}
