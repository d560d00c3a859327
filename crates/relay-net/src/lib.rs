//! In-process pub/sub relay.
//!
//! Plays the role the reference system delegates to its hosted realtime
//! service: a dumb fan-out channel per room, no authority, no storage.
//! Every peer that joins a room gets a [`RoomTransport`] whose publishes
//! reach every subscriber of that room (the publisher included — the
//! session drops its own echoes by session id).
//!
//! Delivery is best-effort: a receiver that lags far enough behind loses
//! messages and silently desyncs for the round, which is all the
//! protocol promises.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kwali_core::game_state::RoomCode;
use kwali_core::message::Envelope;
use kwali_core::net::{ChannelRx, ChannelTx, RoomTransport};
use log::warn;
use thiserror::Error;
use tokio::sync::broadcast;

/// Buffered envelopes per room before slow receivers start losing them.
const ROOM_CAPACITY: usize = 256;

/// Relay failures surfaced to the session (which logs and carries on).
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The room channel has no live subscribers left.
    #[error("room channel closed")]
    Closed,
    /// The envelope could not be encoded or decoded.
    #[error("bad envelope: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Registry of room channels, shared by every peer in the process.
#[derive(Clone, Default)]
pub struct RelayHub {
    rooms: Arc<Mutex<HashMap<RoomCode, broadcast::Sender<Vec<u8>>>>>,
}

impl RelayHub {
    /// Empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a room, creating it on first join.
    ///
    /// The returned transport carries JSON wire bytes, so what crosses
    /// this hub is exactly what a remote relay would carry.
    #[must_use]
    pub fn join(&self, room: &RoomCode) -> RoomTransport {
        let mut rooms = self.rooms.lock().expect("relay registry poisoned");
        let tx = rooms
            .entry(room.clone())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .clone();
        let rx = tx.subscribe();

        RoomTransport {
            tx: Box::new(RelayTx { tx }),
            rx: Box::new(RelayRx { rx }),
        }
    }

    /// Number of live subscribers in a room.
    #[must_use]
    pub fn subscriber_count(&self, room: &RoomCode) -> usize {
        self.rooms
            .lock()
            .expect("relay registry poisoned")
            .get(room)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

struct RelayTx {
    tx: broadcast::Sender<Vec<u8>>,
}

#[async_trait]
impl ChannelTx for RelayTx {
    async fn publish(&mut self, envelope: Envelope) -> anyhow::Result<()> {
        let bytes = envelope.to_bytes().map_err(ChannelError::Codec)?;
        self.tx.send(bytes).map_err(|_| ChannelError::Closed)?;
        Ok(())
    }
}

struct RelayRx {
    rx: broadcast::Receiver<Vec<u8>>,
}

#[async_trait]
impl ChannelRx for RelayRx {
    async fn try_recv(&mut self) -> anyhow::Result<Option<Envelope>> {
        match self.rx.try_recv() {
            Ok(bytes) => {
                Ok(Some(Envelope::from_bytes(&bytes).map_err(ChannelError::Codec)?))
            },
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                // Accepted failure mode: the peer just lost n messages.
                warn!("relay receiver lagged, {n} envelopes dropped");
                Ok(None)
            },
            Err(broadcast::error::TryRecvError::Closed) => {
                Err(ChannelError::Closed.into())
            },
        }
    }
}
