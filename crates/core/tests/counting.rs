//! Counting engine: which player and which finger a global count lands on.

use kwali_core::counting::{FingerTarget, locate_target};
use kwali_core::player::{Player, PlayerId, PlayerStatus};
use kwali_core::players_state::PlayerRoster;

fn roster(fingers: &[u8],) -> PlayerRoster {
    let mut roster = PlayerRoster::default();
    for (i, f,) in fingers.iter().enumerate() {
        let mut player =
            Player::new(PlayerId(i as u64 + 1,), format!("P{i}"), false,);
        player.selected_fingers = *f;
        roster.add(player,);
    }
    roster
}

#[test]
fn counts_walk_players_in_roster_order() {
    let roster = roster(&[3, 2, 4,],);

    // Player 1 owns counts 1..=3, player 2 counts 4..=5, player 3 the
    // rest; the local finger index restarts at 0 inside each span.
    let expect = [
        (1, 1, 0,),
        (2, 1, 1,),
        (3, 1, 2,),
        (4, 2, 0,),
        (5, 2, 1,),
        (6, 3, 0,),
        (7, 3, 1,),
        (8, 3, 2,),
        (9, 3, 3,),
    ];
    for (count, owner, finger,) in expect {
        assert_eq!(
            locate_target(&roster, count),
            Some(FingerTarget {
                player_id:    PlayerId(owner,),
                finger_index: finger,
            }),
            "count {count}"
        );
    }
}

#[test]
fn out_of_range_counts_target_nobody() {
    let roster = roster(&[3, 2, 4,],);
    assert_eq!(locate_target(&roster, 0), None);
    assert_eq!(locate_target(&roster, 10), None);
    assert_eq!(locate_target(&roster, 42), None);
}

#[test]
fn eliminated_players_are_skipped() {
    let mut roster = roster(&[3, 2, 4,],);
    roster.get_mut(&PlayerId(2,),).unwrap().status =
        PlayerStatus::Eliminated;

    // With the middle player out the third one now owns counts 4..=7.
    let target = locate_target(&roster, 4,).unwrap();
    assert_eq!(target.player_id, PlayerId(3));
    assert_eq!(target.finger_index, 0);
    assert_eq!(locate_target(&roster, 7).unwrap().player_id, PlayerId(3));
    assert_eq!(locate_target(&roster, 8), None);
}

#[test]
fn empty_roster_targets_nobody() {
    let roster = PlayerRoster::default();
    assert_eq!(locate_target(&roster, 1), None);
}
