//! Player types and per-player round input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chant::ChantWord;

/// Fingers every player starts the game with.
pub const STARTING_FINGERS: u8 = 5;

/// A unique player identifier, stable for the player's lifetime in the
/// session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub struct PlayerId(pub u64,);

impl PlayerId {
    fn get_random_u64() -> Result<u64, getrandom::Error,> {
        let mut buf = [0u8; 8];
        getrandom::fill(&mut buf,)?;
        Ok(u64::from_ne_bytes(buf,),)
    }

    /// Create a new unique (with high probability) player id.
    ///
    /// # Panics
    /// Panics when the OS entropy source is unavailable.
    #[must_use]
    pub fn new_id() -> Self {
        Self(Self::get_random_u64().expect("os entropy",),)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Whether a player is still in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum PlayerStatus {
    /// Still has fingers left.
    Active,
    /// Out of fingers. Never reverts to [`PlayerStatus::Active`].
    Eliminated,
}

/// A single player in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Player {
    /// Unique identifier.
    pub id:               PlayerId,
    /// Display name.
    pub name:             String,
    /// CPU players have their input generated by the driving peer.
    pub is_cpu:           bool,
    /// Remaining fingers (lives), counts down from [`STARTING_FINGERS`].
    pub max_fingers:      u8,
    /// Fingers shown this round, always in `1..=max_fingers`.
    pub selected_fingers: u8,
    /// The chant word this player bets the count will land on. Cosmetic.
    pub selected_bet:     ChantWord,
    /// Elimination status.
    pub status:           PlayerStatus,
}

impl Player {
    /// Create a fresh player with full fingers and default input.
    #[must_use]
    pub fn new(id: PlayerId, name: String, is_cpu: bool,) -> Self {
        Self {
            id,
            name,
            is_cpu,
            max_fingers: STARTING_FINGERS,
            selected_fingers: 1,
            selected_bet: ChantWord::default(),
            status: PlayerStatus::Active,
        }
    }

    /// Whether this player still takes part in rounds.
    #[must_use]
    pub const fn is_active(&self,) -> bool {
        matches!(self.status, PlayerStatus::Active)
    }

    /// Take one finger from this player; eliminates them at zero.
    ///
    /// Keeps `selected_fingers` within the shrunk range so the state
    /// never leaves a player showing more fingers than they have left.
    pub fn lose_finger(&mut self,) {
        self.max_fingers = self.max_fingers.saturating_sub(1,);
        if self.max_fingers == 0 {
            self.status = PlayerStatus::Eliminated;
        } else {
            self.selected_fingers =
                self.selected_fingers.min(self.max_fingers,);
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        write!(
            f,
            "{} ({} fingers left)",
            self.name, self.max_fingers
        )
    }
}
