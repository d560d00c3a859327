//! Ordered player roster.
//!
//! The roster order is the counting order and is part of the replicated
//! state: it must never be rearranged locally, or peers disagree on who
//! owns which finger.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerId};

/// The ordered sequence of players in a session.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct PlayerRoster {
    players: Vec<Player,>,
}

impl PlayerRoster {
    /// Append a player. Duplicate ids are rejected.
    pub fn add(&mut self, player: Player,) -> bool {
        if self.contains(&player.id,) {
            return false;
        }
        self.players.push(player,);
        true
    }

    /// Remove a player by id, preserving the order of the rest.
    pub fn remove(&mut self, id: &PlayerId,) -> Option<Player,> {
        self.players
            .iter()
            .position(|p| &p.id == id,)
            .map(|pos| self.players.remove(pos,),)
    }

    /// Drop every player.
    pub fn clear(&mut self,) {
        self.players.clear();
    }

    /// Whether a player with this id is on the roster.
    #[must_use]
    pub fn contains(&self, id: &PlayerId,) -> bool {
        self.players.iter().any(|p| &p.id == id,)
    }

    /// Look a player up by id.
    #[must_use]
    pub fn get(&self, id: &PlayerId,) -> Option<&Player,> {
        self.players.iter().find(|p| &p.id == id,)
    }

    /// Look a player up by id, mutably.
    pub fn get_mut(&mut self, id: &PlayerId,) -> Option<&mut Player,> {
        self.players.iter_mut().find(|p| &p.id == id,)
    }

    /// Total number of players, eliminated ones included.
    #[must_use]
    pub fn count(&self,) -> usize {
        self.players.len()
    }

    /// Whether the roster has no players at all.
    #[must_use]
    pub fn is_empty(&self,) -> bool {
        self.players.is_empty()
    }

    /// Number of players still in the game.
    #[must_use]
    pub fn count_active(&self,) -> usize {
        self.players.iter().filter(|p| p.is_active(),).count()
    }

    /// The sole survivor, once `count_active() <= 1`.
    #[must_use]
    pub fn first_active(&self,) -> Option<&Player,> {
        self.players.iter().find(|p| p.is_active(),)
    }

    /// Every player in counting order.
    pub fn iter(&self,) -> impl Iterator<Item = &Player,> {
        self.players.iter()
    }

    /// Every player in counting order, mutably.
    pub fn iter_mut(&mut self,) -> impl Iterator<Item = &mut Player,> {
        self.players.iter_mut()
    }

    /// Active players in counting order.
    pub fn active(&self,) -> impl Iterator<Item = &Player,> {
        self.players.iter().filter(|p| p.is_active(),)
    }

    /// Sum of fingers currently shown by active players.
    #[must_use]
    pub fn total_selected_fingers(&self,) -> u32 {
        self.active().map(|p| u32::from(p.selected_fingers,),).sum()
    }
}

impl fmt::Display for PlayerRoster {
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result {
        write!(f, "{:?}", self.players)
    }
}
