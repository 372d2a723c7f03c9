//! Error types for the protocol layer.
//!
//! Two enums, because the two kinds of failure have very different
//! lifetimes:
//!
//! - [`InitError`] happens once, while the layer is being built. It means
//!   this host can't be supported at all and there is no degraded mode.
//! - [`ProtocolError`] happens per message, after initialization succeeded.

use tallyboard_host::HostError;

use crate::{MessageRole, Slot};

/// Fatal errors raised while resolving the host's era and layouts.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// None of the era markers (not even the oldest) were found.
    #[error("unrecognized host {package}: no supported protocol era matched")]
    UnrecognizedHost { package: String },

    /// The server package has no version segment and the host isn't
    /// repackaged, so internal type names can't be built.
    #[error("cannot derive the internal version from server package {0}")]
    MalformedPackage(String),

    /// A type this era needs doesn't exist on the host.
    #[error("required type {0} not found")]
    MissingType(String),

    /// No inner type of the given type matched the search predicate.
    #[error("no inner type of {0} matches the predicate")]
    NoMatchingInnerType(String),

    /// A message type lacks a field the era's layout requires.
    #[error("{type_name} ({role}) has no {slot} field")]
    MissingField {
        role: MessageRole,
        type_name: String,
        slot: Slot,
    },

    /// An enum has neither the named constant nor the fallback ordinal.
    #[error("enum {type_name} has no constant {name} (fallback ordinal {fallback})")]
    MissingEnumConstant {
        type_name: String,
        name: String,
        fallback: usize,
    },

    /// Neither a no-arg constructor nor raw allocation is usable.
    #[error("cannot instantiate {type_name}: {source}")]
    NoConstructor {
        type_name: String,
        #[source]
        source: HostError,
    },
}

/// Errors raised while building or encoding one message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The host refused an instantiation or a field write.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The role has no schema on this era (e.g. team parameters before 1.17).
    #[error("{0} messages do not exist on this host")]
    UnsupportedRole(MessageRole),

    /// A write targeted a slot the message type doesn't have.
    #[error("{role} message has no {slot} field")]
    MissingSlot { role: MessageRole, slot: Slot },

    /// `finish` was called before a required slot was written.
    #[error("{role} message is incomplete: {slot} was never written")]
    Incomplete { role: MessageRole, slot: Slot },

    /// A value needed for this message wasn't resolved at startup.
    #[error("constant {0} is not available on this host")]
    MissingConstant(&'static str),

    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),
}
