//! Si Kwali core types shared by peers.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod action;
pub mod chant;
pub mod counting;
pub mod game_state;
pub mod message;
pub mod net;
pub mod player;
pub mod players_state;
pub mod session;
pub mod timers;
