//! The round state machine.
//!
//! A single [`GameState`] aggregate per peer, mutated only through
//! [`GameState::apply`]: a pure `(state, action) -> state` reducer.
//! Actions that do not fit the current phase are no-ops, never errors —
//! preconditions (such as "two players before starting a round") are the
//! caller's job to enforce before dispatching.

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::action::GameAction;
use crate::chant::ChantWord;
use crate::player::{Player, PlayerId};
use crate::players_state::PlayerRoster;

/// Where the session's transitions originate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum GameMode {
    /// Single device, every player at the same screen.
    Local,
    /// Peers share a room over the broadcast channel.
    Online,
}

/// Phase of the current round.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum RoundPhase {
    /// Players pick fingers and bets.
    Setup,
    /// The chant runs, one finger counted per step.
    Chanting,
    /// The eliminated player is shown.
    Result,
    /// One active player left; terminal until reset.
    GameOver,
}

/// Code identifying an online room, shared out of band between peers.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct RoomCode(String,);

/// Alphabet room codes are drawn from.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated room code.
const ROOM_CODE_LEN: usize = 5;

impl RoomCode {
    /// Normalize a user-entered code (trim, uppercase).
    #[must_use]
    pub fn new(code: &str,) -> Self {
        Self(code.trim().to_ascii_uppercase(),)
    }

    /// Generate a fresh short code for a new room.
    ///
    /// # Panics
    /// Panics when the OS entropy source is unavailable.
    #[must_use]
    pub fn generate() -> Self {
        let mut buf = [0u8; ROOM_CODE_LEN];
        getrandom::fill(&mut buf,).expect("os entropy",);
        let code = buf
            .iter()
            .map(|b| {
                ROOM_CODE_ALPHABET[usize::from(*b,) % ROOM_CODE_ALPHABET.len()]
                    as char
            },)
            .collect::<String>();
        Self(code,)
    }

    /// The code as entered or generated.
    #[must_use]
    pub fn as_str(&self,) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        f.write_str(&self.0,)
    }
}

/// The replicated subset of [`GameState`].
///
/// Peer-local identity (mode, room, who-am-I, host flag) stays out: a
/// sync from the host must never overwrite what the receiving peer knows
/// about itself.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct GameSnapshot {
    /// Players in counting order.
    pub players:                PlayerRoster,
    /// Current round phase.
    pub round_phase:            RoundPhase,
    /// Position in the chant cycle, `None` when idle.
    pub chant_index:            Option<usize,>,
    /// Fingers counted so far this round.
    pub global_finger_count:    u32,
    /// Sum of shown fingers at round start; fixed for the round.
    pub total_fingers_in_round: u32,
    /// The count at which resolution fires (equals the total).
    pub target_finger_index:    u32,
    /// Who lost the round, set during `Result`/`GameOver`.
    pub losing_player_id:       Option<PlayerId,>,
    /// The sole survivor once the game is over. In this ritual the last
    /// one standing takes the forfeit, so "winner" is the player the
    /// punishment falls on.
    pub winner_player_id:       Option<PlayerId,>,
}

/// The whole per-peer game aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct GameState {
    /// Local or online session.
    pub mode:            GameMode,
    /// Room this peer is in, online mode only.
    pub room_code:       Option<RoomCode,>,
    /// Which roster entry is this peer, online mode only.
    pub local_player_id: Option<PlayerId,>,
    /// Whether this peer authors time-driven transitions.
    pub is_host:         bool,
    /// The replicated game fields.
    #[serde(flatten)]
    pub game:            GameSnapshot,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            mode:            GameMode::Local,
            room_code:       None,
            local_player_id: None,
            // A local session drives its own clock.
            is_host:         true,
            game:            GameSnapshot::default(),
        }
    }
}

impl Default for RoundPhase {
    fn default() -> Self {
        Self::Setup
    }
}

impl GameState {
    /// The replicated subset, for a [`GameAction::SyncState`] payload.
    #[must_use]
    pub fn snapshot(&self,) -> GameSnapshot {
        self.game.clone()
    }

    /// Shorthand for the roster.
    #[must_use]
    pub const fn players(&self,) -> &PlayerRoster {
        &self.game.players
    }

    /// Shorthand for the phase.
    #[must_use]
    pub const fn phase(&self,) -> RoundPhase {
        self.game.round_phase
    }

    /// The chant word currently being spoken, if any.
    #[must_use]
    pub fn current_chant_word(&self,) -> Option<ChantWord,> {
        self.game.chant_index.map(ChantWord::from_index,)
    }

    /// Whether the chant has reached its target count.
    #[must_use]
    pub const fn chant_complete(&self,) -> bool {
        self.game.global_finger_count >= self.game.total_fingers_in_round
    }

    /// Apply one action, returning the next state.
    ///
    /// Total and panic-free: an action that is invalid in the current
    /// phase returns the state unchanged.
    #[must_use]
    pub fn apply(&self, action: &GameAction,) -> Self {
        let mut next = self.clone();
        match action {
            GameAction::SetMode(mode,) => {
                next.mode = *mode;
            },

            GameAction::SetRoom {
                code,
                local_id,
                is_host,
            } => {
                next.room_code = Some(code.clone(),);
                next.local_player_id = Some(*local_id,);
                next.is_host = *is_host;
            },

            GameAction::SyncState(snapshot,) => {
                // Wholesale catch-up from the host; identity fields stay.
                next.game = (**snapshot).clone();
            },

            GameAction::AddPlayer { id, name, is_cpu, } => {
                if next.game.round_phase != RoundPhase::Setup {
                    return next;
                }
                let id = id.unwrap_or_else(PlayerId::new_id,);
                if !next
                    .game
                    .players
                    .add(Player::new(id, name.clone(), *is_cpu,),)
                {
                    debug!("ignoring duplicate join of player {id}");
                }
            },

            GameAction::RemovePlayer { id, } => {
                // Leaving is a lobby-only operation; eliminations during
                // the game are a status flag, not removal.
                if next.game.round_phase != RoundPhase::Setup {
                    return next;
                }
                next.game.players.remove(id,);
            },

            GameAction::SetPlayerInput { id, fingers, bet, } => {
                // Last-write-wins per player; the machine does not
                // re-validate against max_fingers (caller precondition).
                if let Some(player,) = next.game.players.get_mut(id,) {
                    player.selected_fingers = *fingers;
                    player.selected_bet = *bet;
                }
            },

            GameAction::StartRound => {
                if next.game.round_phase != RoundPhase::Setup {
                    return next;
                }
                let total = next.game.players.total_selected_fingers();
                next.game.round_phase = RoundPhase::Chanting;
                next.game.chant_index = None;
                next.game.global_finger_count = 0;
                next.game.total_fingers_in_round = total;
                next.game.target_finger_index = total;
                next.game.losing_player_id = None;
            },

            GameAction::StepChant => {
                // Guarded against stale timers and duplicate delivery: a
                // step past the target would desynchronize the count.
                if next.game.round_phase != RoundPhase::Chanting
                    || next.chant_complete()
                {
                    return next;
                }
                next.game.global_finger_count += 1;
                next.game.chant_index = Some(match next.game.chant_index {
                    Some(index,) => (index + 1) % ChantWord::COUNT,
                    None => 0,
                },);
            },

            GameAction::ResolveRound => {
                // Only resolvable out of the chant; a second delivery is
                // a no-op rather than a double finger loss.
                if next.game.round_phase != RoundPhase::Chanting {
                    return next;
                }
                next.resolve_round();
            },

            GameAction::ResetGame => {
                next = Self {
                    mode: self.mode,
                    room_code: self.room_code.clone(),
                    local_player_id: self.local_player_id,
                    is_host: self.is_host,
                    game: GameSnapshot::default(),
                };
            },

            GameAction::NextRound => {
                if next.game.round_phase != RoundPhase::Result {
                    return next;
                }
                next.game.round_phase = RoundPhase::Setup;
                next.game.chant_index = None;
                next.game.global_finger_count = 0;
                next.game.total_fingers_in_round = 0;
                next.game.target_finger_index = 0;
                next.game.losing_player_id = None;
            },
        }
        next
    }

    /// Find the owner of the last counted finger, take one of their
    /// fingers, and move to `Result` or `GameOver`.
    ///
    /// The descending walk here lands on the same finger the counting
    /// engine's forward walk reaches at `global_count == total`.
    fn resolve_round(&mut self,) {
        let mut remaining = self.game.total_fingers_in_round;
        let mut loser_id = None;

        for player in self.game.players.iter_mut() {
            if !player.is_active() {
                continue;
            }
            let span = u32::from(player.selected_fingers,);
            if span >= remaining {
                loser_id = Some(player.id,);
                player.lose_finger();
                break;
            }
            remaining -= span;
        }

        self.game.losing_player_id = loser_id;
        if self.game.players.count_active() <= 1 {
            self.game.round_phase = RoundPhase::GameOver;
            self.game.winner_player_id =
                self.game.players.first_active().map(|p| p.id,);
        } else {
            self.game.round_phase = RoundPhase::Result;
        }
    }
}
