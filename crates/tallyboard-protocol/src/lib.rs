//! Version-adaptive scoreboard packet layer for Tallyboard.
//!
//! The host's scoreboard messages change shape between releases. This
//! crate works out, once, what the running host looks like and then builds
//! correctly populated messages for it:
//!
//! - **Eras** ([`Era`], [`VersionResolver`]) classify the host into one of
//!   four capability tiers.
//! - **Layouts** ([`EraLayout`], [`Slot`]) hold every era-dependent choice
//!   about which type plays which [`MessageRole`] and where its fields are.
//! - **Schemas** ([`MessageSchema`], [`SchemaRegistry`]) classify each
//!   message type's fields so slots resolve to field indices.
//! - **Construction** ([`PacketFactory`], [`MessageBuilder`]) instantiates
//!   blank messages and seals them into [`Packet`]s.
//! - **Formatting codes** ([`format`]) for line splitting.
//! - **Codecs** ([`Codec`], [`JsonCodec`]) for transports that leave the
//!   process.

mod builder;
mod codec;
mod construct;
mod era;
mod error;
pub mod format;
mod layout;
mod registry;
mod schema;

pub use builder::{MessageBuilder, Packet};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use construct::{PacketConstructor, PacketFactory};
pub use era::{
    COMPONENT_AFFIX_LIMIT, Era, HostNames, HostVersion, LEGACY_AFFIX_LIMIT,
    LEGACY_LINE_LIMIT, LEGACY_TITLE_LIMIT, VersionResolver,
};
pub use error::{InitError, ProtocolError};
pub use layout::{EnumRole, EraLayout, MessageRole, Slot, SlotKind, TypeLocation};
pub use registry::{KnownConstant, SchemaRegistry};
pub use schema::{FieldCategory, MessageSchema, SchemaField};
