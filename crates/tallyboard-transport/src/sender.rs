//! The packet sender: resolve, then write.

use std::fmt;
use std::sync::Arc;

use tallyboard_protocol::Packet;

use crate::{ClientId, ConnectionResolver, TransportError};

/// Delivers packets to clients through a [`ConnectionResolver`].
///
/// No retry and no queueing: a packet for a client without a live
/// connection is dropped.
#[derive(Clone)]
pub struct PacketSender {
    resolver: Arc<dyn ConnectionResolver>,
}

impl PacketSender {
    pub fn new(resolver: Arc<dyn ConnectionResolver>) -> Self {
        Self { resolver }
    }

    /// Sends one packet to `client`.
    ///
    /// A missing or closed connection is not an error. The connection
    /// closing between the check and the write isn't either.
    pub fn send(&self, client: ClientId, packet: Packet) -> Result<(), TransportError> {
        let Some(connection) = self.resolver.resolve(client) else {
            tracing::debug!(%client, role = %packet.role(), "no connection, packet skipped");
            return Ok(());
        };
        if !connection.is_open() {
            tracing::debug!(%client, role = %packet.role(), "connection closed, packet skipped");
            return Ok(());
        }

        tracing::trace!(%client, role = %packet.role(), "sending packet");
        match connection.send_packet(packet) {
            Err(TransportError::ConnectionClosed(_)) => {
                tracing::debug!(%client, "connection closed during send");
                Ok(())
            }
            result => result,
        }
    }
}

impl fmt::Debug for PacketSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketSender").finish_non_exhaustive()
    }
}
