//! Host introspection model for Tallyboard.
//!
//! The game server's scoreboard messages are internal types whose names,
//! packages and field layouts shift between releases. This crate models
//! what can be learned about them at runtime:
//!
//! - **Types** ([`TypeDescriptor`], [`FieldType`]) describe a host type's
//!   own fields in declaration order.
//! - **Objects** ([`HostObject`], [`Value`]) are instances of those types,
//!   written field by field with type checking.
//! - **The host** ([`Host`], [`RawAllocator`]) is the narrow trait the
//!   packet layer talks to.
//! - **The catalog** ([`CatalogHost`]) is an in-memory host covering the
//!   supported releases.
//!
//! # How it fits in the stack
//!
//! ```text
//! Session (above)   ← builds scoreboard messages for one client
//!     ↕
//! Protocol          ← resolves era, schemas, constructors
//!     ↕
//! Host (this crate) ← what the running server exposes
//! ```

mod catalog;
mod error;
mod host;
mod types;
mod value;

pub use catalog::{CHAT_FORMATS, CatalogHost, Release, SERVER_PACKAGE_ROOT};
pub use error::HostError;
pub use host::{Host, RawAllocator};
pub use types::{FieldDescriptor, FieldType, TypeDescriptor};
pub use value::{Component, EnumConstant, HostObject, Value};
