//! `SidebarServer` builder and accept loop.
//!
//! This is the entry point for serving sidebars over WebSocket. It ties
//! the layers together: host → protocol → transport → session.

use std::net::SocketAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tallyboard_host::Host;
use tallyboard_protocol::JsonCodec;
use tallyboard_session::{PacketLayer, SessionConfig, SidebarManager};
use tallyboard_transport::{ConnectionRegistry, WebSocketTransport};

use crate::TallyboardError;
use crate::handler::{SidebarHandler, handle_client};

/// Shared server state passed to each client task.
pub(crate) struct ServerState<H: SidebarHandler> {
    pub(crate) manager: SidebarManager,
    pub(crate) registry: Arc<ConnectionRegistry>,
    pub(crate) handler: H,
}

/// Server settings, loadable from any serde format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Settings every sidebar is created with.
    pub session: SessionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session: SessionConfig::default(),
        }
    }
}

/// Builder for configuring and starting a sidebar server.
///
/// # Example
///
/// ```rust,ignore
/// use tallyboard::prelude::*;
///
/// let server = SidebarServer::builder()
///     .bind("0.0.0.0:8080")
///     .build(Arc::new(CatalogHost::release(Release::V1_8R3)), MyHandler)
///     .await?;
/// server.run().await
/// ```
#[derive(Debug, Clone, Default)]
pub struct SidebarServerBuilder {
    config: ServerConfig,
}

impl SidebarServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a loaded configuration.
    pub fn from_config(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every sidebar is created with.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Initializes the packet layer for `host` and binds the listener.
    ///
    /// # Errors
    /// - [`TallyboardError::Init`] if the host isn't a supported era
    /// - [`TallyboardError::Transport`] if the address can't be bound
    pub async fn build<H: SidebarHandler>(
        self,
        host: Arc<dyn Host>,
        handler: H,
    ) -> Result<SidebarServer<H>, TallyboardError> {
        let registry = Arc::new(ConnectionRegistry::new());
        let layer = PacketLayer::initialize(host, registry.clone())?;
        let transport =
            WebSocketTransport::bind(&self.config.bind_addr, Arc::clone(&registry)).await?;

        let state = Arc::new(ServerState {
            manager: SidebarManager::new(layer, self.config.session),
            registry,
            handler,
        });

        Ok(SidebarServer { transport, state })
    }
}

/// A sidebar server bound to its address.
///
/// Call [`run()`](Self::run) to start accepting clients.
pub struct SidebarServer<H: SidebarHandler> {
    transport: WebSocketTransport<JsonCodec>,
    state: Arc<ServerState<H>>,
}

impl<H: SidebarHandler> SidebarServer<H> {
    /// Creates a new builder.
    pub fn builder() -> SidebarServerBuilder {
        SidebarServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The manager holding every connected client's sidebar.
    pub fn manager(&self) -> &SidebarManager {
        &self.state.manager
    }

    /// Runs the accept loop.
    ///
    /// Every accepted client gets a sidebar and a handler task. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), TallyboardError> {
        tracing::info!(
            era = %self.state.manager.layer().era(),
            "sidebar server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(accepted) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(accepted, state).await {
                            tracing::warn!(error = %e, "client handler failed");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
