use crate::ClientId;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The client's connection is gone.
    #[error("connection to {0} closed")]
    ConnectionClosed(ClientId),

    /// Writing to the connection failed for another reason.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
