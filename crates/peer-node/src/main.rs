// crates/peer-node/src/main.rs
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use kwali_core::action::GameAction;
use kwali_core::counting::locate_target;
use kwali_core::game_state::RoundPhase;
use kwali_core::session::{GameSession, Pace};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relay_net::RelayHub;

/// CLI --------------------------------------------------------------
#[derive(Parser, Debug,)]
struct Options {
    /// CPU players in a local game
    #[arg(long, default_value_t = 4)]
    players: u8,

    /// Run the online demo with this many follower peers instead
    #[arg(long, default_value_t = 0)]
    peers: u8,

    /// My nickname
    #[arg(long, default_value = "Host")]
    nick: String,

    /// Milliseconds between chant steps
    #[arg(long, default_value_t = 600)]
    step_ms: u64,
}

impl Options {
    fn pace(&self,) -> Pace {
        Pace {
            chant_step:    Duration::from_millis(self.step_ms,),
            resolve:       Duration::from_millis(self.step_ms + 400,),
            cpu_think_min: Duration::from_millis(self.step_ms / 2,),
            cpu_think_max: Duration::from_millis(self.step_ms,),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(),> {
    let opt = Options::parse();

    // init logger
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info",),
    )
    .init();

    if opt.peers > 0 {
        run_online_demo(opt.peers, &opt.nick, opt.pace(),).await
    } else {
        run_local(opt.players.max(2,), opt.pace(),).await
    }
}

// local game loop ---------------------------------------------------
async fn run_local(cpus: u8, pace: Pace,) -> Result<(),> {
    let mut session = GameSession::local();
    session.set_pace(pace,);
    for i in 1..=cpus {
        session
            .propose(GameAction::AddPlayer {
                id:     None,
                name:   format!("CPU {i}"),
                is_cpu: true,
            },)
            .await;
    }
    info!("local game with {cpus} CPU players");

    let mut round = 0u32;
    let mut last_count = 0u32;
    loop {
        session.tick().await;
        let state = session.state();

        match state.phase() {
            RoundPhase::Setup => {
                if !session.cpu_pending() && session.can_start_round() {
                    round += 1;
                    last_count = 0;
                    info!("-- round {round} --");
                    session.propose(GameAction::StartRound,).await;
                }
            },
            RoundPhase::Chanting => {
                let count = state.game.global_finger_count;
                if count != last_count {
                    last_count = count;
                    log_chant_step(&session,);
                }
            },
            RoundPhase::Result => {
                let loser = state
                    .game
                    .losing_player_id
                    .and_then(|id| state.players().get(&id,),);
                if let Some(loser,) = loser {
                    info!("round {round}: {loser} loses a finger");
                }
                tokio::time::sleep(Duration::from_millis(400,),).await;
                session.propose(GameAction::NextRound,).await;
            },
            RoundPhase::GameOver => {
                let survivor = state
                    .game
                    .winner_player_id
                    .and_then(|id| state.players().get(&id,),);
                if let Some(survivor,) = survivor {
                    info!(
                        "game over after {round} rounds: {} takes the forfeit",
                        survivor.name
                    );
                }
                return Ok((),);
            },
        }

        tokio::time::sleep(Duration::from_millis(20,),).await;
    }
}

fn log_chant_step(session: &GameSession,) {
    let state = session.state();
    let word = state
        .current_chant_word()
        .map(|w| w.label(),)
        .unwrap_or("...",);
    let target = locate_target(
        state.players(),
        state.game.global_finger_count,
    );
    let name = target
        .and_then(|t| state.players().get(&t.player_id,),)
        .map_or("?", |p| p.name.as_str(),);
    info!(
        "chant {:>2}/{}: \"{word}\" on {name}",
        state.game.global_finger_count, state.game.total_fingers_in_round
    );
}

// online demo: host + followers sharing one in-process relay --------
async fn run_online_demo(
    followers: u8,
    nick: &str,
    pace: Pace,
) -> Result<(),> {
    let hub = RelayHub::new();
    let mut rng = StdRng::from_os_rng();

    let mut host = GameSession::local();
    host.set_pace(pace,);
    let code = host.create_room();
    host.attach_transport(hub.join(&code,),);
    host.local_join(nick.to_string(),).await;

    let mut peers = Vec::new();
    for i in 1..=followers {
        let mut peer = GameSession::local();
        peer.join_room(code.clone(),);
        peer.attach_transport(hub.join(&code,),);
        peer.local_join(format!("Player {i}"),).await;
        peers.push(peer,);
    }
    info!("room {code}: host plus {followers} followers");

    let mut picked = vec![false; peers.len()];
    // extra ticks between "all inputs sent" and StartRound, so the host
    // has polled every input before it freezes the round total
    let mut ready_ticks = 0u8;
    loop {
        host.tick().await;
        for peer in &mut peers {
            peer.tick().await;
        }

        match host.state().phase() {
            RoundPhase::Setup => {
                for (peer, picked,) in peers.iter_mut().zip(&mut picked,) {
                    if *picked {
                        continue;
                    }
                    let Some(id,) = peer.state().local_player_id else {
                        continue;
                    };
                    let max = peer
                        .state()
                        .players()
                        .get(&id,)
                        .map_or(1, |p| p.max_fingers.max(1,),);
                    peer.propose(GameAction::SetPlayerInput {
                        id,
                        fingers: rng.random_range(1..=max,),
                        bet: kwali_core::chant::ChantWord::from_index(
                            rng.random_range(0..6,),
                        ),
                    },)
                    .await;
                    *picked = true;
                }

                if picked.iter().all(|p| *p,) && host.can_start_round() {
                    ready_ticks += 1;
                    if ready_ticks > 2 {
                        ready_ticks = 0;
                        host.propose(GameAction::StartRound,).await;
                    }
                } else {
                    ready_ticks = 0;
                }
            },
            RoundPhase::Result => {
                picked.iter_mut().for_each(|p| *p = false,);
                tokio::time::sleep(Duration::from_millis(200,),).await;
                host.propose(GameAction::NextRound,).await;
            },
            RoundPhase::GameOver => break,
            RoundPhase::Chanting => {},
        }

        tokio::time::sleep(Duration::from_millis(20,),).await;
    }

    // let the last broadcasts land, then compare replicas
    for _ in 0..5 {
        for peer in &mut peers {
            peer.tick().await;
        }
        tokio::time::sleep(Duration::from_millis(20,),).await;
    }

    let reference = host.state().snapshot();
    let diverged = peers
        .iter()
        .filter(|p| p.state().snapshot() != reference,)
        .count();
    let survivor = reference
        .winner_player_id
        .and_then(|id| reference.players.get(&id,).cloned(),);
    if let Some(survivor,) = survivor {
        info!("game over: {} takes the forfeit", survivor.name);
    }
    if diverged == 0 {
        info!("all {} follower replicas match the host", peers.len());
    } else {
        log::warn!("{diverged} follower replicas diverged from the host");
    }
    Ok((),)
}
