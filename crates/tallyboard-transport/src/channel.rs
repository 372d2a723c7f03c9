//! In-process connections backed by an unbounded channel.

use tallyboard_protocol::Packet;
use tokio::sync::mpsc;

use crate::{ClientId, Connection, TransportError};

/// The receiving end of a [`ChannelConnection`].
pub type PacketReceiver = mpsc::UnboundedReceiver<Packet>;

/// A [`Connection`] that pushes packets into a channel.
///
/// Sending never blocks, so the synchronous session core can feed an
/// async consumer. The connection counts as closed once the receiver is
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelConnection {
    client: ClientId,
    tx: mpsc::UnboundedSender<Packet>,
}

impl ChannelConnection {
    /// Creates a connection and the receiver its packets arrive on.
    pub fn pair(client: ClientId) -> (Self, PacketReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { client, tx }, rx)
    }
}

impl Connection for ChannelConnection {
    fn client(&self) -> ClientId {
        self.client
    }

    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn send_packet(&self, packet: Packet) -> Result<(), TransportError> {
        self.tx
            .send(packet)
            .map_err(|_| TransportError::ConnectionClosed(self.client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_closes_when_receiver_dropped() {
        let (conn, rx) = ChannelConnection::pair(ClientId::new(1));
        assert!(conn.is_open());
        drop(rx);
        assert!(!conn.is_open());
    }
}
