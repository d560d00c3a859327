//! The closed transition vocabulary of the round state machine.

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::chant::ChantWord;
use crate::game_state::{GameMode, GameSnapshot, RoomCode};
use crate::player::PlayerId;

/// One transition of the round state machine.
///
/// This is also the unit of replication: in online mode every proposed
/// action crosses the room channel verbatim and is replayed by every
/// other peer, so each variant carries exactly the payload a remote peer
/// needs to apply it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
#[serde(tag = "type", content = "payload")]
pub enum GameAction {
    /// Switch between local and online play.
    SetMode(GameMode,),
    /// Bind this peer to a room and fix its identity in it.
    SetRoom {
        /// The shared room code.
        code:     RoomCode,
        /// This peer's roster id.
        local_id: PlayerId,
        /// Whether this peer drives the clock for the room.
        is_host:  bool,
    },
    /// Wholesale catch-up with the host's replicated state.
    SyncState(Box<GameSnapshot,>,),
    /// Add a player to the lobby.
    AddPlayer {
        /// Fixed id for online joins; `None` mints a fresh one locally.
        id:     Option<PlayerId,>,
        /// Display name.
        name:   String,
        /// CPU players get their input auto-generated.
        is_cpu: bool,
    },
    /// Remove a player from the lobby (pre-game only).
    RemovePlayer {
        /// Who leaves.
        id: PlayerId,
    },
    /// A player's finger count and bet for the coming round.
    SetPlayerInput {
        /// Whose input.
        id:      PlayerId,
        /// Fingers to show, `1..=max_fingers`.
        fingers: u8,
        /// Chant word bet (cosmetic).
        bet:     ChantWord,
    },
    /// Freeze the round total and enter the chant.
    StartRound,
    /// Count one finger and speak the next chant word.
    StepChant,
    /// Eliminate the owner of the last counted finger.
    ResolveRound,
    /// Back to an empty lobby; session identity survives.
    ResetGame,
    /// Back to setup for another round; players survive.
    NextRound,
}

impl GameAction {
    /// Short label of the action variant, for logs.
    #[must_use]
    pub const fn label(&self,) -> &'static str {
        match self {
            Self::SetMode(..) => "SetMode",
            Self::SetRoom { .. } => "SetRoom",
            Self::SyncState(..) => "SyncState",
            Self::AddPlayer { .. } => "AddPlayer",
            Self::RemovePlayer { .. } => "RemovePlayer",
            Self::SetPlayerInput { .. } => "SetPlayerInput",
            Self::StartRound => "StartRound",
            Self::StepChant => "StepChant",
            Self::ResolveRound => "ResolveRound",
            Self::ResetGame => "ResetGame",
            Self::NextRound => "NextRound",
        }
    }
}

impl Display for GameAction {
    fn fmt(&self, f: &mut Formatter<'_,>,) -> fmt::Result {
        f.write_str(self.label(),)
    }
}
