//! The [`Host`] trait: the narrow window into the running game server.
//!
//! Everything the packet layer knows about the server's internals comes
//! through this trait. It's deliberately small: look up a type by name,
//! call a no-arg constructor, hand out a raw allocator, and convert text
//! into the host's chat component type.

use std::sync::Arc;

use crate::{HostError, HostObject, TypeDescriptor, Value};

/// Allocates instances of host types without running any constructor.
///
/// Many internal message types only have constructors taking arguments
/// the caller can't produce yet. Allocating a zeroed instance and filling
/// its fields afterwards sidesteps that.
pub trait RawAllocator: Send + Sync {
    /// Returns a zeroed instance of `ty`.
    fn allocate(&self, ty: &Arc<TypeDescriptor>) -> Result<HostObject, HostError>;
}

/// A running game server, seen through its introspection surface.
///
/// # Trait bounds
///
/// - `Send + Sync` so one host can back every session on every thread.
/// - `'static` because the packet layer keeps it for the process lifetime.
pub trait Host: Send + Sync + 'static {
    /// The package of the server implementation, e.g.
    /// `org.bukkit.craftbukkit.v1_8_R3`. Older releases encode their
    /// internal version in the last segment.
    fn server_package(&self) -> &str;

    /// Looks up a type by fully qualified name.
    fn find_type(&self, name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Invokes the type's no-arg constructor.
    ///
    /// # Errors
    /// [`HostError::NoSuchConstructor`] if the type has none accessible.
    fn construct(&self, ty: &Arc<TypeDescriptor>) -> Result<HostObject, HostError>;

    /// Locates the host's raw allocation primitive.
    ///
    /// This can be an expensive lookup; callers should do it once and
    /// keep the result.
    fn raw_allocator(&self) -> Result<Arc<dyn RawAllocator>, HostError>;

    /// Converts legacy formatted text into the host's chat component.
    fn component_from_text(&self, text: &str) -> Result<Value, HostError>;
}
