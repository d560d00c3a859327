//! A fully in-memory integration test: host and followers in one room.

use integration_tests::{make_room, pump};
use kwali_core::action::GameAction;
use kwali_core::chant::ChantWord;
use kwali_core::game_state::RoundPhase;
use kwali_core::session::GameSession;
use relay_net::RelayHub;

const MAX_TICKS: u32 = 200_000;

#[tokio::test]
async fn late_joiner_catches_up_via_snapshot() {
    let _ = env_logger::builder().is_test(true,).try_init();
    let hub = RelayHub::new();
    let (mut sessions, _code,) = make_room(&hub, 2,);

    // the host is on the roster before anyone else subscribes a player
    sessions[0].local_join("Host".into(),).await;
    pump(&mut sessions,).await;

    sessions[1].local_join("P1".into(),).await;
    for _ in 0..5 {
        pump(&mut sessions,).await;
    }
    sessions[2].local_join("P2".into(),).await;
    for _ in 0..5 {
        pump(&mut sessions,).await;
    }

    // every peer sees all three players, in the same order
    for session in &sessions {
        assert_eq!(session.state().players().count(), 3);
    }
    let reference = sessions[0].state().snapshot();
    for session in &sessions[1..] {
        assert_eq!(session.state().snapshot(), reference);
    }
}

#[tokio::test]
async fn input_updates_are_last_write_wins() {
    let hub = RelayHub::new();
    let (mut sessions, _code,) = make_room(&hub, 1,);
    sessions[0].local_join("Host".into(),).await;
    pump(&mut sessions,).await;
    sessions[1].local_join("P1".into(),).await;
    for _ in 0..5 {
        pump(&mut sessions,).await;
    }

    let follower_id = sessions[1].state().local_player_id.unwrap();
    sessions[1]
        .propose(GameAction::SetPlayerInput {
            id:      follower_id,
            fingers: 2,
            bet:     ChantWord::Pak,
        },)
        .await;
    sessions[1]
        .propose(GameAction::SetPlayerInput {
            id:      follower_id,
            fingers: 5,
            bet:     ChantWord::Reket,
        },)
        .await;
    for _ in 0..5 {
        pump(&mut sessions,).await;
    }

    for session in &sessions {
        let player = session.state().players().get(&follower_id,).unwrap();
        assert_eq!(player.selected_fingers, 5);
        assert_eq!(player.selected_bet, ChantWord::Reket);
    }
}

#[tokio::test]
async fn full_game_replicates_to_every_follower() {
    let _ = env_logger::builder().is_test(true,).try_init();
    let hub = RelayHub::new();
    let (mut sessions, _code,) = make_room(&hub, 2,);

    sessions[0].local_join("Host".into(),).await;
    // a CPU managed by the host, replicated like any other player
    sessions[0]
        .propose(GameAction::AddPlayer {
            id:     None,
            name:   "CPU 1".into(),
            is_cpu: true,
        },)
        .await;
    pump(&mut sessions,).await;
    sessions[1].local_join("P1".into(),).await;
    sessions[2].local_join("P2".into(),).await;
    for _ in 0..5 {
        pump(&mut sessions,).await;
    }

    let mut picked = false;
    let mut ready_ticks = 0;
    let mut ticks = 0;
    while sessions[0].state().phase() != RoundPhase::GameOver {
        ticks += 1;
        assert!(ticks < MAX_TICKS, "game did not converge");
        pump(&mut sessions,).await;

        match sessions[0].state().phase() {
            RoundPhase::Setup => {
                if !picked {
                    picked = true;
                    for session in sessions[1..].iter_mut() {
                        let id = session.state().local_player_id.unwrap();
                        let fingers = session
                            .state()
                            .players()
                            .get(&id,)
                            .map_or(1, |p| p.max_fingers.max(1,),);
                        session
                            .propose(GameAction::SetPlayerInput {
                                id,
                                fingers,
                                bet: ChantWord::Kwali,
                            },)
                            .await;
                    }
                }
                // give the inputs a pump before freezing the total
                if picked && !sessions[0].cpu_pending() {
                    ready_ticks += 1;
                    if ready_ticks > 2 && sessions[0].can_start_round() {
                        ready_ticks = 0;
                        sessions[0]
                            .propose(GameAction::StartRound,)
                            .await;
                    }
                }
            },
            RoundPhase::Result => {
                picked = false;
                sessions[0].propose(GameAction::NextRound,).await;
            },
            RoundPhase::Chanting | RoundPhase::GameOver => {},
        }
    }

    // drain the last broadcasts
    for _ in 0..10 {
        pump(&mut sessions,).await;
    }

    let reference = sessions[0].state().snapshot();
    assert_eq!(reference.players.count_active(), 1);
    assert!(reference.winner_player_id.is_some());
    for (i, session,) in sessions.iter().enumerate().skip(1,) {
        assert_eq!(
            session.state().snapshot(),
            reference,
            "follower {i} diverged"
        );
    }
}

#[tokio::test]
async fn follower_without_relay_stays_inert_but_alive() {
    // Missing transport degrades to a no-op channel: publishes succeed,
    // nothing arrives, nothing crashes.
    let mut session = GameSession::local();
    session.join_room(kwali_core::game_state::RoomCode::new("GHOST",),);

    session.local_join("Lonely".into(),).await;
    for _ in 0..20 {
        session.tick().await;
    }
    assert_eq!(session.state().players().count(), 1);
    assert_eq!(session.state().phase(), RoundPhase::Setup);
}
