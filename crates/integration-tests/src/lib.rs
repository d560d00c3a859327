//! Support code for the multi-peer integration scenarios in `tests/`.

use kwali_core::game_state::RoomCode;
use kwali_core::session::{GameSession, Pace};
use relay_net::RelayHub;

/// Pump every session once, in a fixed order (host first).
pub async fn pump(sessions: &mut [GameSession],) {
    for session in sessions.iter_mut() {
        session.tick().await;
    }
}

/// A room on `hub`: one host (index 0, immediate pace) plus followers,
/// all subscribed, nobody on the roster yet.
#[must_use = "the sessions drive the game"]
pub fn make_room(
    hub: &RelayHub,
    followers: usize,
) -> (Vec<GameSession,>, RoomCode,) {
    let mut host = GameSession::local();
    host.set_pace(Pace::immediate(),);
    let code = host.create_room();
    host.attach_transport(hub.join(&code,),);

    let mut sessions = vec![host];
    for _ in 0..followers {
        let mut peer = GameSession::local();
        peer.join_room(code.clone(),);
        peer.attach_transport(hub.join(&code,),);
        sessions.push(peer,);
    }
    (sessions, code,)
}
