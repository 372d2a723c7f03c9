//! Error types for the session layer.

use tallyboard_protocol::ProtocolError;
use tallyboard_transport::TransportError;

/// Errors returned by sidebar operations.
///
/// Validation errors are raised before anything is sent, so the session is
/// untouched. `OperationFailed` is raised mid-operation: the session keeps
/// whatever state it had reached.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A read past the last line.
    #[error("line {index} out of range (sidebar has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// More lines than the sidebar can show.
    #[error("{count} lines exceed the maximum of {max}")]
    TooManyLines { count: usize, max: usize },

    /// Title too long for this host's text limits.
    #[error("title is {len} characters, the limit is {max}")]
    TitleTooLong { len: usize, max: usize },

    /// A line too long for this host's text limits.
    #[error("line {index} is {len} characters, the limit is {max}")]
    LineTooLong { index: usize, len: usize, max: usize },

    /// The sidebar was deleted. Deletion is final.
    #[error("sidebar {0} is deleted")]
    Deleted(String),

    /// Building or sending a packet failed.
    #[error("failed to {action}: {source}")]
    OperationFailed {
        action: &'static str,
        #[source]
        source: PacketError,
    },
}

impl SessionError {
    pub(crate) fn failed(action: &'static str, source: impl Into<PacketError>) -> Self {
        Self::OperationFailed {
            action,
            source: source.into(),
        }
    }
}

/// What went wrong while producing or delivering one packet.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
