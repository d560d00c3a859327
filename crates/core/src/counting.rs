//! The counting engine.
//!
//! Maps a 1-based global finger count onto the player (and the finger
//! within that player's hand) currently being pointed at. Both the chant
//! animation and the final resolution derive from this same walk, so the
//! finger the animation lands on is always the finger that loses.

use crate::player::PlayerId;
use crate::players_state::PlayerRoster;

/// The finger a global count points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerTarget {
    /// Owner of the finger.
    pub player_id: PlayerId,
    /// 0-based position within the owner's shown fingers.
    pub finger_index: usize,
}

/// Locate the finger a 1-based `global_count` points at.
///
/// Walks active players in roster order, accumulating the fingers seen so
/// far; the owner is the first player whose span reaches `global_count`.
/// Returns `None` for count 0 or a count beyond the active total —
/// callers treat that as "nobody is currently targeted".
///
/// Pure function of the roster and the count: every peer derives the
/// identical target from the same replicated state.
#[must_use]
pub fn locate_target(
    roster: &PlayerRoster,
    global_count: u32,
) -> Option<FingerTarget> {
    if global_count == 0 {
        return None;
    }

    let mut running: u32 = 0;
    for player in roster.active() {
        let span = u32::from(player.selected_fingers);
        if running + span >= global_count {
            return Some(FingerTarget {
                player_id: player.id,
                finger_index: (global_count - running - 1) as usize,
            });
        }
        running += span;
    }

    None
}
