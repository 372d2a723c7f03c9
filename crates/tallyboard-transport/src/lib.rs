//! Packet delivery layer for Tallyboard.
//!
//! Sessions hand finished packets to a [`PacketSender`], which looks up
//! the client's live [`Connection`] through a [`ConnectionResolver`] and
//! writes to it. A client without a live connection is skipped silently:
//! a sidebar for a player who just left is not an error.
//!
//! Delivery is synchronous. Connections that need async I/O (the WebSocket
//! transport) put a [`ChannelConnection`] in front of a pump task.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

mod channel;
mod error;
mod registry;
mod sender;
#[cfg(feature = "websocket")]
mod websocket;

pub use channel::{ChannelConnection, PacketReceiver};
pub use error::TransportError;
pub use registry::ConnectionRegistry;
pub use sender::PacketSender;
#[cfg(feature = "websocket")]
pub use websocket::{AcceptedClient, WebSocketTransport};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tallyboard_protocol::Packet;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    /// Creates a `ClientId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// A client's send path.
pub trait Connection: Send + Sync + 'static {
    /// The client this connection belongs to.
    fn client(&self) -> ClientId;

    /// Returns `false` once the peer is gone.
    fn is_open(&self) -> bool;

    /// Queues a packet for the client.
    ///
    /// # Errors
    /// [`TransportError::ConnectionClosed`] if the peer went away.
    fn send_packet(&self, packet: Packet) -> Result<(), TransportError>;
}

/// Maps a client to its live connection.
pub trait ConnectionResolver: Send + Sync + 'static {
    /// The client's connection, or `None` if it has none.
    fn resolve(&self, client: ClientId) -> Option<Arc<dyn Connection>>;
}
