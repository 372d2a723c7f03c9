//! WebSocket transport using `tokio-tungstenite`.
//!
//! Each accepted client gets a [`ChannelConnection`] registered under a
//! fresh [`ClientId`] and a pump task. The pump encodes queued packets
//! with the transport's codec, writes them as binary frames, and
//! deregisters the client once the socket closes.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tallyboard_protocol::{Codec, JsonCodec};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

use crate::{ChannelConnection, ClientId, ConnectionRegistry, PacketReceiver, TransportError};

/// A client the transport has just accepted.
#[derive(Debug)]
pub struct AcceptedClient {
    pub client: ClientId,
    pub addr: SocketAddr,
    /// Finishes when the client disconnects and has been deregistered.
    pub pump: JoinHandle<()>,
}

/// Listens for WebSocket clients and wires them into a registry.
pub struct WebSocketTransport<C = JsonCodec> {
    listener: TcpListener,
    registry: Arc<ConnectionRegistry>,
    codec: Arc<C>,
}

impl WebSocketTransport<JsonCodec> {
    /// Binds to `addr`; accepted clients are registered in `registry`.
    pub async fn bind(
        addr: &str,
        registry: Arc<ConnectionRegistry>,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self {
            listener,
            registry,
            codec: Arc::new(JsonCodec),
        })
    }
}

impl<C: Codec> WebSocketTransport<C> {
    /// Swaps the codec packets are encoded with.
    pub fn with_codec<D: Codec>(self, codec: D) -> WebSocketTransport<D> {
        WebSocketTransport {
            listener: self.listener,
            registry: self.registry,
            codec: Arc::new(codec),
        }
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Waits for the next client, completes the handshake, registers its
    /// connection and starts its pump.
    pub async fn accept(&mut self) -> Result<AcceptedClient, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let client = ClientId::next();
        let (connection, rx) = ChannelConnection::pair(client);
        self.registry.register(Arc::new(connection));
        tracing::debug!(%client, %addr, "accepted WebSocket client");

        let pump = tokio::spawn(pump(
            client,
            ws,
            rx,
            Arc::clone(&self.codec),
            Arc::clone(&self.registry),
        ));

        Ok(AcceptedClient { client, addr, pump })
    }
}

async fn pump<C: Codec>(
    client: ClientId,
    ws: WebSocketStream<TcpStream>,
    mut rx: PacketReceiver,
    codec: Arc<C>,
    registry: Arc<ConnectionRegistry>,
) {
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            packet = rx.recv() => {
                let Some(packet) = packet else { break };
                let bytes = match codec.encode(&packet) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(%client, error = %e, "dropping unencodable packet");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Binary(bytes.into())).await {
                    tracing::debug!(%client, error = %e, "write failed");
                    break;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // clients have nothing to say
                Some(Err(e)) => {
                    tracing::debug!(%client, error = %e, "read failed");
                    break;
                }
            }
        }
    }

    registry.deregister(client);
    tracing::debug!(%client, "client disconnected");
}
