//! Zero-argument instantiation of message types.
//!
//! Older releases give every scoreboard message a no-arg constructor. Newer
//! ones only have constructors taking arguments the layer can't produce,
//! so those types are raw-allocated and populated field by field instead.
//! The strategy is picked once per type.

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tallyboard_host::{Host, HostError, HostObject, RawAllocator, TypeDescriptor};

use crate::{InitError, ProtocolError};

/// Hands out [`PacketConstructor`]s and owns the shared raw allocator.
pub struct PacketFactory {
    host: Arc<dyn Host>,
    allocator: OnceLock<Arc<dyn RawAllocator>>,
    /// Serializes the first allocator lookup so it happens exactly once.
    allocator_init: Mutex<()>,
}

impl PacketFactory {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            allocator: OnceLock::new(),
            allocator_init: Mutex::new(()),
        }
    }

    /// Picks the construction strategy for `ty`.
    ///
    /// # Errors
    /// [`InitError::NoConstructor`] if the type has no no-arg constructor
    /// and the host offers no raw allocation.
    pub fn constructor_for(
        &self,
        ty: Arc<TypeDescriptor>,
    ) -> Result<PacketConstructor, InitError> {
        let strategy = if ty.has_no_arg_constructor {
            Strategy::NoArg(Arc::clone(&self.host))
        } else {
            let allocator = self.allocator().map_err(|source| InitError::NoConstructor {
                type_name: ty.name.clone(),
                source,
            })?;
            Strategy::Raw(allocator)
        };
        tracing::trace!(type_name = %ty.name, strategy = strategy.name(), "constructor selected");
        Ok(PacketConstructor { ty, strategy })
    }

    /// The memoized raw allocator, looked up on first call.
    fn allocator(&self) -> Result<Arc<dyn RawAllocator>, HostError> {
        if let Some(allocator) = self.allocator.get() {
            return Ok(Arc::clone(allocator));
        }
        let _guard = self
            .allocator_init
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won the race while we waited.
        if let Some(allocator) = self.allocator.get() {
            return Ok(Arc::clone(allocator));
        }
        let allocator = self.host.raw_allocator()?;
        tracing::debug!("raw allocator resolved");
        Ok(Arc::clone(self.allocator.get_or_init(|| allocator)))
    }
}

impl fmt::Debug for PacketFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketFactory")
            .field("allocator_resolved", &self.allocator.get().is_some())
            .finish()
    }
}

enum Strategy {
    NoArg(Arc<dyn Host>),
    Raw(Arc<dyn RawAllocator>),
}

impl Strategy {
    fn name(&self) -> &'static str {
        match self {
            Self::NoArg(_) => "no-arg",
            Self::Raw(_) => "raw",
        }
    }
}

/// Produces blank instances of one message type.
pub struct PacketConstructor {
    ty: Arc<TypeDescriptor>,
    strategy: Strategy,
}

impl PacketConstructor {
    /// A fresh instance with no fields written by the caller yet.
    pub fn construct(&self) -> Result<HostObject, ProtocolError> {
        let object = match &self.strategy {
            Strategy::NoArg(host) => host.construct(&self.ty)?,
            Strategy::Raw(allocator) => allocator.allocate(&self.ty)?,
        };
        Ok(object)
    }

    pub fn type_descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.ty
    }

    /// Returns `true` if instances are raw-allocated.
    pub fn is_raw(&self) -> bool {
        matches!(self.strategy, Strategy::Raw(_))
    }
}

impl fmt::Debug for PacketConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketConstructor")
            .field("type", &self.ty.name)
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
