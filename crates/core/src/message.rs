//! Wire envelope for room broadcasts.
//!
//! Every replicated action travels as a `{type: "broadcast", event:
//! "GAME_UPDATE", payload: <action>}` JSON envelope, stamped with the
//! publishing peer's session id so receivers can drop their own echoes.

use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::action::GameAction;

/// The one broadcast event this protocol uses.
pub const GAME_UPDATE_EVENT: &str = "GAME_UPDATE";

/// A peer-process identifier, minted once per session.
///
/// Distinct from [`crate::player::PlayerId`]: a spectator peer has a
/// session id but no roster entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct SessionId(pub u64,);

impl SessionId {
    fn get_random_u64() -> Result<u64, getrandom::Error,> {
        let mut buf = [0u8; 8];
        getrandom::fill(&mut buf,)?;
        Ok(u64::from_ne_bytes(buf,),)
    }

    /// Create a new unique (with high probability) session id.
    ///
    /// # Panics
    /// Panics when the OS entropy source is unavailable.
    #[must_use]
    pub fn new_id() -> Self {
        Self(Self::get_random_u64().expect("os entropy",),)
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_,>,) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Kind discriminator of the envelope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    /// Fan-out to every subscriber of the room.
    Broadcast,
}

/// A published room message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize,)]
pub struct Envelope {
    /// Always [`EnvelopeKind::Broadcast`] today.
    #[serde(rename = "type")]
    pub kind:    EnvelopeKind,
    /// Event name, always [`GAME_UPDATE_EVENT`] today.
    pub event:   String,
    /// Who published this envelope.
    pub sender:  SessionId,
    /// The replicated action.
    pub payload: GameAction,
}

impl Envelope {
    /// Wrap an action for publication.
    #[must_use]
    pub fn game_update(sender: SessionId, action: GameAction,) -> Self {
        Self {
            kind: EnvelopeKind::Broadcast,
            event: GAME_UPDATE_EVENT.to_string(),
            sender,
            payload: action,
        }
    }

    /// Serialize to the JSON wire form.
    pub fn to_bytes(&self,) -> Result<Vec<u8,>, serde_json::Error,> {
        serde_json::to_vec(self,)
    }

    /// Deserialize from the JSON wire form.
    pub fn from_bytes(buf: &[u8],) -> Result<Self, serde_json::Error,> {
        serde_json::from_slice(buf,)
    }

    /// Label of the carried action, for logs.
    #[must_use]
    pub const fn label(&self,) -> &'static str {
        self.payload.label()
    }
}

impl Display for Envelope {
    fn fmt(&self, f: &mut Formatter<'_,>,) -> fmt::Result {
        write!(f, "{} from {}", self.label(), self.sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_as_json() {
        let sender = SessionId(7,);
        let env = Envelope::game_update(sender, GameAction::StepChant,);
        let bytes = env.to_bytes().unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&bytes,).unwrap();
        assert_eq!(value["type"], "broadcast");
        assert_eq!(value["event"], "GAME_UPDATE");

        let back = Envelope::from_bytes(&bytes,).unwrap();
        assert_eq!(back, env);
    }
}
