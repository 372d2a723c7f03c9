//! Integration tests for packet delivery through the registry.

use std::sync::Arc;

use tallyboard_host::{CatalogHost, Release};
use tallyboard_protocol::{MessageRole, Packet, SchemaRegistry, Slot};
use tallyboard_transport::{
    ChannelConnection, ClientId, Connection, ConnectionRegistry, PacketSender, TransportError,
};

fn display_packet(id: &str) -> Packet {
    let registry = SchemaRegistry::build(Arc::new(CatalogHost::release(Release::V1_8R3))).unwrap();
    let mut builder = registry.builder(MessageRole::DisplayObjective).unwrap();
    builder
        .set_int(Slot::int(0), 1)
        .unwrap()
        .set_text(Slot::text(0), id)
        .unwrap();
    builder.finish().unwrap()
}

fn sender_with(registry: &Arc<ConnectionRegistry>) -> PacketSender {
    PacketSender::new(registry.clone())
}

#[test]
fn test_send_to_registered_client_delivers() {
    let registry = Arc::new(ConnectionRegistry::new());
    let client = ClientId::new(1);
    let (conn, mut rx) = ChannelConnection::pair(client);
    registry.register(Arc::new(conn));

    sender_with(&registry)
        .send(client, display_packet("sb-00000001"))
        .unwrap();

    let packet = rx.try_recv().unwrap();
    assert_eq!(packet.display_text(Slot::text(0)), Some("sb-00000001"));
}

#[test]
fn test_send_to_unknown_client_is_silent() {
    let registry = Arc::new(ConnectionRegistry::new());
    let result = sender_with(&registry).send(ClientId::new(42), display_packet("sb-1"));
    assert!(result.is_ok());
}

#[test]
fn test_send_to_closed_connection_is_silent() {
    let registry = Arc::new(ConnectionRegistry::new());
    let client = ClientId::new(3);
    let (conn, rx) = ChannelConnection::pair(client);
    registry.register(Arc::new(conn));
    drop(rx);

    let result = sender_with(&registry).send(client, display_packet("sb-1"));
    assert!(result.is_ok());
}

struct BrokenConnection(ClientId);

impl Connection for BrokenConnection {
    fn client(&self) -> ClientId {
        self.0
    }

    fn is_open(&self) -> bool {
        true
    }

    fn send_packet(&self, _packet: Packet) -> Result<(), TransportError> {
        Err(TransportError::SendFailed(std::io::Error::other("broken pipe")))
    }
}

#[test]
fn test_send_failure_other_than_close_propagates() {
    let registry = Arc::new(ConnectionRegistry::new());
    let client = ClientId::new(4);
    registry.register(Arc::new(BrokenConnection(client)));

    let result = sender_with(&registry).send(client, display_packet("sb-1"));
    assert!(matches!(result, Err(TransportError::SendFailed(_))));
}
