//! Channel traits every transport implements.
//!
//! The session treats the room channel as a black box: publish an
//! envelope, poll for envelopes other peers published. A real relay,
//! the in-memory test double and the no-op fallback all sit behind the
//! same two traits, selected at startup.

use async_trait::async_trait;

use crate::message::Envelope;

/// Outbound half of a room channel.
#[async_trait]
pub trait ChannelTx: Send + Sync {
    /// Publish an envelope to every subscriber of the room.
    ///
    /// Fire-and-forget: no delivery confirmation is consumed by the
    /// core, a failure only surfaces in the logs.
    async fn publish(&mut self, envelope: Envelope,) -> anyhow::Result<(),>;
}

/// Inbound half of a room channel.
#[async_trait]
pub trait ChannelRx: Send + Sync {
    /// Next pending envelope, or `None` when the channel is idle.
    async fn try_recv(&mut self,) -> anyhow::Result<Option<Envelope,>,>;
}

/// Both halves of a room subscription.
pub struct RoomTransport {
    /// Publish side.
    pub tx: Box<dyn ChannelTx,>,
    /// Receive side.
    pub rx: Box<dyn ChannelRx,>,
}

impl RoomTransport {
    /// A transport with no relay behind it.
    ///
    /// Publishes succeed trivially and nothing is ever received, so a
    /// peer without a network degrades to inert-but-working local play
    /// instead of crashing.
    #[must_use]
    pub fn unconnected() -> Self {
        Self {
            tx: Box::new(NoopTx,),
            rx: Box::new(NoopRx,),
        }
    }
}

/// Publish half that drops everything.
pub struct NoopTx;

#[async_trait]
impl ChannelTx for NoopTx {
    async fn publish(&mut self, _envelope: Envelope,) -> anyhow::Result<(),> {
        Ok((),)
    }
}

/// Receive half that never yields.
pub struct NoopRx;

#[async_trait]
impl ChannelRx for NoopRx {
    async fn try_recv(&mut self,) -> anyhow::Result<Option<Envelope,>,> {
        Ok(None,)
    }
}
