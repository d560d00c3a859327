//! Transport seam between the session and a room's broadcast channel.

pub mod traits;

pub use traits::{ChannelRx, ChannelTx, NoopRx, NoopTx, RoomTransport};
