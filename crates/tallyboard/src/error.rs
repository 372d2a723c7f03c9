//! Unified error type for Tallyboard.

use tallyboard_host::HostError;
use tallyboard_protocol::{InitError, ProtocolError};
use tallyboard_session::SessionError;
use tallyboard_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// Users of the `tallyboard` crate deal with this single type; `?`
/// converts the sub-crate errors through the generated `From` impls.
#[derive(Debug, thiserror::Error)]
pub enum TallyboardError {
    /// The host refused a type lookup or field write.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The packet layer could not be set up for this host.
    #[error(transparent)]
    Init(#[from] InitError),

    /// A message could not be built or encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Binding, accepting or sending failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A sidebar operation was rejected or failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
