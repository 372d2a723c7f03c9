//! Codecs for carrying packets out of the process.
//!
//! In-process delivery hands [`Packet`](crate::Packet) values straight to
//! a connection. Transports that cross a process boundary (the WebSocket
//! transport, a proxy) encode them first through a [`Codec`].

use serde::Serialize;

use crate::ProtocolError;

/// Encodes values to bytes. Packets only ever leave the process, so
/// there is no decoding side.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// per-client pump task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] producing JSON via `serde_json`. Behind the `json` feature
/// (on by default).
///
/// ```rust
/// use tallyboard_host::Value;
/// use tallyboard_protocol::{Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Value::Text("sb-1a2b3c4d".into())).unwrap();
///
/// let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
/// assert_eq!(json["kind"], "Text");
/// assert_eq!(json["value"], "sb-1a2b3c4d");
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }
}
