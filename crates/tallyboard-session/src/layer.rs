//! The packet layer: the shared, read-only half of every session.

use std::sync::Arc;

use tallyboard_host::Host;
use tallyboard_protocol::{Era, InitError, SchemaRegistry};
use tallyboard_transport::{ConnectionResolver, PacketSender};

/// Everything resolved about the host plus the send path.
///
/// Built once, then shared by every session through an `Arc`. Nothing in
/// it changes after [`initialize`](Self::initialize) returns.
#[derive(Debug)]
pub struct PacketLayer {
    registry: SchemaRegistry,
    sender: PacketSender,
}

impl PacketLayer {
    /// Resolves the host's era, schemas and constructors.
    ///
    /// # Errors
    /// Any [`InitError`]. There is no degraded mode: if this fails, no
    /// sidebar can be shown on this host.
    pub fn initialize(
        host: Arc<dyn Host>,
        resolver: Arc<dyn ConnectionResolver>,
    ) -> Result<Arc<Self>, InitError> {
        let registry = SchemaRegistry::build(host).inspect_err(|e| {
            tracing::error!(error = %e, "packet layer initialization failed");
        })?;
        tracing::info!(era = %registry.version().era, "packet layer ready");
        Ok(Arc::new(Self {
            registry,
            sender: PacketSender::new(resolver),
        }))
    }

    pub fn era(&self) -> Era {
        self.registry.version().era
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn sender(&self) -> &PacketSender {
        &self.sender
    }
}
