//! Session-level behavior: the driving peer's clock and its guards.

use kwali_core::action::GameAction;
use kwali_core::game_state::{GameMode, RoomCode, RoundPhase};
use kwali_core::session::{GameSession, Pace};

const MAX_TICKS: u32 = 100_000;

#[tokio::test]
async fn local_cpu_game_runs_to_game_over() {
    let _ = env_logger::builder().is_test(true,).try_init();

    let mut session = GameSession::local();
    session.set_pace(Pace::immediate(),);
    for i in 1..=3u8 {
        session
            .propose(GameAction::AddPlayer {
                id:     None,
                name:   format!("CPU {i}"),
                is_cpu: true,
            },)
            .await;
    }

    let mut ticks = 0;
    while session.state().phase() != RoundPhase::GameOver {
        ticks += 1;
        assert!(ticks < MAX_TICKS, "game did not converge");

        session.tick().await;
        match session.state().phase() {
            RoundPhase::Setup => {
                if !session.cpu_pending() && session.can_start_round() {
                    session.propose(GameAction::StartRound,).await;
                }
            },
            RoundPhase::Result => {
                session.propose(GameAction::NextRound,).await;
            },
            _ => {},
        }
    }

    let state = session.state();
    assert_eq!(state.players().count_active(), 1);
    let survivor = state.players().first_active().unwrap().id;
    assert_eq!(state.game.winner_player_id, Some(survivor));
    // eliminated players stay on the roster
    assert_eq!(state.players().count(), 3);
}

#[tokio::test]
async fn follower_never_advances_the_chant() {
    let mut follower = GameSession::new(
        kwali_core::net::RoomTransport::unconnected(),
    );
    follower.set_pace(Pace::immediate(),);
    follower.join_room(RoomCode::new("ROOM1",),);
    assert_eq!(follower.state().mode, GameMode::Online);
    assert!(!follower.is_driver());

    // replay what the host would have sent
    for action in [
        GameAction::AddPlayer {
            id:     Some(kwali_core::player::PlayerId(1,),),
            name:   "a".into(),
            is_cpu: false,
        },
        GameAction::AddPlayer {
            id:     Some(kwali_core::player::PlayerId(2,),),
            name:   "b".into(),
            is_cpu: false,
        },
        GameAction::StartRound,
    ] {
        follower.apply_locally(&action,);
    }
    assert_eq!(follower.state().phase(), RoundPhase::Chanting);

    for _ in 0..50 {
        follower.tick().await;
    }
    // purely reactive: without the host's StepChant nothing moves
    assert_eq!(follower.state().game.global_finger_count, 0);
    assert_eq!(follower.state().phase(), RoundPhase::Chanting);
}

#[tokio::test]
async fn reset_during_chant_stops_the_clock() {
    let mut session = GameSession::local();
    session.set_pace(Pace::immediate(),);
    for i in 1..=2u8 {
        session
            .propose(GameAction::AddPlayer {
                id:     None,
                name:   format!("CPU {i}"),
                is_cpu: true,
            },)
            .await;
    }

    // into the chant
    let mut ticks = 0;
    while session.state().phase() != RoundPhase::Chanting {
        ticks += 1;
        assert!(ticks < MAX_TICKS);
        session.tick().await;
        if session.state().phase() == RoundPhase::Setup
            && !session.cpu_pending()
            && session.can_start_round()
        {
            session.propose(GameAction::StartRound,).await;
        }
    }

    session.propose(GameAction::ResetGame,).await;
    assert_eq!(session.state().phase(), RoundPhase::Setup);

    // a stale chant timer must not fire into the reset state
    for _ in 0..50 {
        session.tick().await;
    }
    assert_eq!(session.state().phase(), RoundPhase::Setup);
    assert_eq!(session.state().game.global_finger_count, 0);
    assert!(session.state().players().is_empty());
}
