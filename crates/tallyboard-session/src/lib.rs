//! Per-client scoreboard sidebars for Tallyboard.
//!
//! This is the layer collaborators use. A [`SidebarManager`] hands out one
//! [`ScoreboardSession`] per client; the session turns title and line
//! changes into the minimal set of scoreboard packets for the host's era.
//!
//! # How it fits in the stack
//!
//! ```text
//! Server / game code (above)  ← update_title, update_lines, delete
//!     ↕
//! Session Layer (this crate)  ← diffing, splitting, lifecycle
//!     ↕
//! Protocol + Transport (below) ← building packets, delivering them
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tallyboard_host::{CatalogHost, Release};
//! use tallyboard_session::{PacketLayer, SessionConfig, SidebarManager};
//! use tallyboard_transport::{ChannelConnection, ClientId, ConnectionRegistry};
//!
//! let registry = Arc::new(ConnectionRegistry::new());
//! let layer = PacketLayer::initialize(
//!     Arc::new(CatalogHost::release(Release::V1_8R3)),
//!     registry.clone(),
//! )
//! .unwrap();
//! let manager = SidebarManager::new(layer, SessionConfig::default());
//!
//! let client = ClientId::new(1);
//! let (conn, mut packets) = ChannelConnection::pair(client);
//! registry.register(Arc::new(conn));
//!
//! let sidebar = manager.create(client).unwrap();
//! sidebar.update_title("§6Arena").unwrap();
//! sidebar.update_lines(["Kills: 3", "Deaths: 1"]).unwrap();
//! assert!(packets.try_recv().is_ok());
//! ```

mod config;
mod error;
mod id;
mod layer;
mod manager;
pub mod messages;
mod session;
mod split;

pub use config::SessionConfig;
pub use error::{PacketError, SessionError};
pub use id::next_session_id;
pub use layer::PacketLayer;
pub use manager::SidebarManager;
pub use session::{ScoreboardSession, SidebarStatus};
pub use split::split_line;
