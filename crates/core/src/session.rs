//! Per-peer game session: local state plus room replication.
//!
//! The session owns the one [`GameState`] aggregate of this peer and is
//! the only way callers mutate it. Two entry points, kept deliberately
//! distinct:
//!
//! * [`GameSession::apply_locally`] — run the reducer, nothing else.
//!   The receive path uses only this, so a replayed action is never
//!   re-published (no echo loop).
//! * [`GameSession::propose`] — apply locally, then publish to the room
//!   channel when the session is online.
//!
//! Time-driven transitions (the chant loop, the resolution delay, CPU
//! input) are authored only by the driving peer — the host in online
//! mode, the single process in local mode. Everyone else is purely
//! reactive to the channel.

use std::time::Duration;

use ahash::AHashSet;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::action::GameAction;
use crate::chant::ChantWord;
use crate::game_state::{GameMode, GameState, RoomCode, RoundPhase};
use crate::message::{Envelope, SessionId};
use crate::net::RoomTransport;
use crate::player::PlayerId;
use crate::timers::HostTimers;

/// Interval between chant steps on the driving peer.
pub const CHANT_STEP_INTERVAL: Duration = Duration::from_millis(600,);

/// Pause between the chant completing and the round resolving.
pub const RESOLVE_DELAY: Duration = Duration::from_millis(1_000,);

/// CPU "thinking" delay bounds.
const CPU_THINK_MIN: Duration = Duration::from_millis(300,);
const CPU_THINK_MAX: Duration = Duration::from_millis(900,);

/// Timing profile of the driving peer's transitions.
#[derive(Debug, Clone,)]
pub struct Pace {
    /// Delay between chant steps.
    pub chant_step:    Duration,
    /// Delay between the last step and the resolution.
    pub resolve:       Duration,
    /// Shortest CPU think delay.
    pub cpu_think_min: Duration,
    /// Longest CPU think delay.
    pub cpu_think_max: Duration,
}

impl Default for Pace {
    fn default() -> Self {
        Self {
            chant_step:    CHANT_STEP_INTERVAL,
            resolve:       RESOLVE_DELAY,
            cpu_think_min: CPU_THINK_MIN,
            cpu_think_max: CPU_THINK_MAX,
        }
    }
}

impl Pace {
    /// Everything fires on the next tick. For tests and simulations.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            chant_step:    Duration::ZERO,
            resolve:       Duration::ZERO,
            cpu_think_min: Duration::ZERO,
            cpu_think_max: Duration::ZERO,
        }
    }
}

/// One peer's game session.
pub struct GameSession {
    state:      GameState,
    session_id: SessionId,
    transport:  RoomTransport,
    timers:     HostTimers,
    pace:       Pace,
    rng:        StdRng,
    /// CPUs that already picked this setup phase (driver-local, not
    /// replicated).
    cpu_done:   AHashSet<PlayerId,>,
}

impl GameSession {
    /// Session over the given transport.
    #[must_use]
    pub fn new(transport: RoomTransport,) -> Self {
        Self {
            state: GameState::default(),
            session_id: SessionId::new_id(),
            transport,
            timers: HostTimers::default(),
            pace: Pace::default(),
            rng: StdRng::from_os_rng(),
            cpu_done: AHashSet::new(),
        }
    }

    /// Override the driving-peer timing profile.
    pub fn set_pace(&mut self, pace: Pace,) {
        self.pace = pace;
    }

    /// Session for single-device play, no relay behind it.
    #[must_use]
    pub fn local() -> Self {
        Self::new(RoomTransport::unconnected(),)
    }

    /// Read-only view of the aggregate.
    #[must_use]
    pub const fn state(&self,) -> &GameState {
        &self.state
    }

    /// This peer's channel identity.
    #[must_use]
    pub const fn session_id(&self,) -> SessionId {
        self.session_id
    }

    /// Whether this peer authors time-driven transitions.
    #[must_use]
    pub fn is_driver(&self,) -> bool {
        self.state.mode == GameMode::Local || self.state.is_host
    }

    /// UI precondition for `StartRound`; the reducer itself does not
    /// re-check it.
    #[must_use]
    pub fn can_start_round(&self,) -> bool {
        self.state.players().count_active() >= 2
    }

    /// Whether any active CPU still owes an input this setup phase.
    #[must_use]
    pub fn cpu_pending(&self,) -> bool {
        self.state.phase() == RoundPhase::Setup
            && self
                .state
                .players()
                .active()
                .any(|p| p.is_cpu && !self.cpu_done.contains(&p.id,),)
    }

    /// Swap the transport, e.g. after joining a room.
    pub fn attach_transport(&mut self, transport: RoomTransport,) {
        self.transport = transport;
    }

    /// Become host of a fresh room. Returns the code to share.
    pub fn create_room(&mut self,) -> RoomCode {
        let code = RoomCode::generate();
        let local_id = PlayerId::new_id();
        self.apply_locally(&GameAction::SetMode(GameMode::Online,),);
        self.apply_locally(&GameAction::SetRoom {
            code:     code.clone(),
            local_id,
            is_host:  true,
        },);
        info!("created room {code} as host");
        code
    }

    /// Join an existing room as a follower.
    pub fn join_room(&mut self, code: RoomCode,) {
        let local_id = PlayerId::new_id();
        self.apply_locally(&GameAction::SetMode(GameMode::Online,),);
        self.apply_locally(&GameAction::SetRoom {
            code:     code.clone(),
            local_id,
            is_host:  false,
        },);
        info!("joined room {code}");
    }

    /// Put this peer's own player on the roster.
    pub async fn local_join(&mut self, name: String,) {
        let id = self.state.local_player_id;
        self.propose(GameAction::AddPlayer {
            id,
            name,
            is_cpu: false,
        },)
        .await;
    }

    /// Run the reducer on one action, without publishing it.
    pub fn apply_locally(&mut self, action: &GameAction,) {
        let prev_phase = self.state.phase();
        self.state = self.state.apply(action,);
        let phase = self.state.phase();

        if phase != prev_phase {
            debug!("{}: phase {prev_phase:?} -> {phase:?}", action.label());
            if prev_phase == RoundPhase::Chanting {
                // Invariant: no chant timer may survive leaving the
                // chant, or it fires into a reset state.
                self.timers.clear_round();
            }
            if phase == RoundPhase::Setup {
                self.timers.clear_all();
                self.cpu_done.clear();
            }
        }
    }

    /// Apply an action locally, then publish it to the room.
    ///
    /// Publication is fire-and-forget: a failed publish is logged and
    /// play continues (the affected round may silently desync, which is
    /// all the reference protocol promises).
    pub async fn propose(&mut self, mut action: GameAction,) {
        // Mint ids before the action leaves this peer: a replicated
        // AddPlayer without an id would mint a different one per peer.
        if let GameAction::AddPlayer { id: id @ None, .. } = &mut action {
            *id = Some(PlayerId::new_id(),);
        }

        self.apply_locally(&action,);

        if self.state.mode == GameMode::Online
            && self.state.room_code.is_some()
        {
            let envelope = Envelope::game_update(self.session_id, action,);
            if let Err(e,) = self.transport.tx.publish(envelope,).await {
                warn!("publish failed: {e}");
            }
        }
    }

    /// Drain the channel and replay every foreign action, in arrival
    /// order. Own echoes are dropped by session id.
    pub async fn poll_remote(&mut self,) {
        let mut newcomer = false;
        loop {
            match self.transport.rx.try_recv().await {
                Ok(Some(envelope,),) => {
                    if envelope.sender == self.session_id {
                        continue;
                    }
                    debug!("remote action: {envelope}");
                    if matches!(
                        envelope.payload,
                        GameAction::AddPlayer { .. }
                    ) {
                        newcomer = true;
                    }
                    self.apply_locally(&envelope.payload,);
                },
                Ok(None,) => break,
                Err(e,) => {
                    warn!("room channel receive failed: {e}");
                    break;
                },
            }
        }

        // The host answers a lobby join with a full snapshot so late
        // joiners see players added before they subscribed.
        if newcomer
            && self.state.is_host
            && self.state.mode == GameMode::Online
            && self.state.phase() == RoundPhase::Setup
        {
            let snapshot = Box::new(self.state.snapshot(),);
            self.propose(GameAction::SyncState(snapshot,),).await;
        }
    }

    /// One scheduling step: pump the channel, then, on the driving peer
    /// only, advance whatever the current phase owes to the clock.
    pub async fn tick(&mut self,) {
        self.poll_remote().await;

        if !self.is_driver() {
            return;
        }

        match self.state.phase() {
            RoundPhase::Setup => self.tick_cpu().await,
            RoundPhase::Chanting => self.tick_chant().await,
            RoundPhase::Result | RoundPhase::GameOver => {},
        }
    }

    /// Auto-fill CPU input, one CPU at a time with a short think delay.
    async fn tick_cpu(&mut self,) {
        let next_cpu = self
            .state
            .players()
            .active()
            .find(|p| p.is_cpu && !self.cpu_done.contains(&p.id,),)
            .map(|p| (p.id, p.max_fingers,),);

        let Some((id, max_fingers,),) = next_cpu else {
            return;
        };

        let min = self.pace.cpu_think_min.as_millis() as u64;
        let max = self.pace.cpu_think_max.as_millis() as u64;
        let think =
            Duration::from_millis(self.rng.random_range(min..=max.max(min,),),);
        self.timers.arm_cpu_think(think,);
        if !self.timers.cpu_think_due() {
            return;
        }

        let fingers = self.rng.random_range(1..=max_fingers.max(1,),);
        let bet = ChantWord::from_index(
            self.rng.random_range(0..ChantWord::COUNT,),
        );
        self.cpu_done.insert(id,);
        debug!("cpu {id} shows {fingers} and bets {bet}");
        self.propose(GameAction::SetPlayerInput { id, fingers, bet, },)
            .await;
    }

    /// Drive the chant: a step every interval until the target count,
    /// then resolution after a beat.
    async fn tick_chant(&mut self,) {
        if self.state.chant_complete() {
            self.timers.arm_resolve(self.pace.resolve,);
            if self.timers.resolve_due() {
                self.propose(GameAction::ResolveRound,).await;
            }
        } else {
            self.timers.arm_chant_step(self.pace.chant_step,);
            if self.timers.chant_step_due() {
                self.propose(GameAction::StepChant,).await;
            }
        }
    }
}
