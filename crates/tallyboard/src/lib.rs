//! # Tallyboard
//!
//! Per-player scoreboard sidebars for game servers whose internal packet
//! types change from release to release.
//!
//! Tallyboard inspects the host once at startup, works out which protocol
//! era it belongs to, and from then on builds objective, score and team
//! packets for that era. Callers only ever see a [`ScoreboardSession`]:
//! a title and up to 15 lines per client.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tallyboard::prelude::*;
//!
//! struct Hello;
//!
//! impl SidebarHandler for Hello {
//!     async fn on_connect(&self, sidebar: Arc<ScoreboardSession>) {
//!         let _ = sidebar.update_title("§eHello");
//!     }
//! }
//!
//! # async fn run() -> Result<(), TallyboardError> {
//! tallyboard::init_tracing();
//! let server = SidebarServer::<Hello>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(Arc::new(CatalogHost::release(Release::V1_8R3)), Hello)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::TallyboardError;
pub use handler::SidebarHandler;
pub use server::{ServerConfig, SidebarServer, SidebarServerBuilder};

pub use tallyboard_host as host;
pub use tallyboard_protocol as protocol;
pub use tallyboard_session as session;
pub use tallyboard_transport as transport;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `info`.
///
/// Does nothing if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub mod prelude {
    pub use crate::{
        ServerConfig, SidebarHandler, SidebarServer, SidebarServerBuilder, TallyboardError,
    };
    pub use tallyboard_host::{CatalogHost, Host, Release};
    pub use tallyboard_protocol::{Era, InitError, ProtocolError};
    pub use tallyboard_session::{
        PacketLayer, ScoreboardSession, SessionConfig, SessionError, SidebarManager,
        SidebarStatus,
    };
    pub use tallyboard_transport::{ClientId, ConnectionRegistry, TransportError};
}
