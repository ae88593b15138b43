//! Lobby Core
//!
//! Stable API definitions for the lobby presence subsystem of a multiplayer
//! master server:
//! - Payload types exchanged with the transport layer (`FriendsResponse`,
//!   `StatsSnapshot`) and the non-owning `SessionRef` handle
//! - Delivery seams (`FriendsResponder`, `StatsSink`) through which the
//!   serialized core hands results back to the outside world
//! - The unified `LobbyError` type and centralized configuration
//!
//! The engine that drives these definitions lives in `lobby-runtime`.

pub mod config;
pub mod errors;
pub mod outbound;
pub mod types;

pub use config::{ChannelConfig, LobbyConfig, StatsConfig};
pub use errors::{DeliveryError, LobbyError, LobbyResult};
pub use outbound::{FriendsResponder, StatsSink};
pub use types::{FriendsResponse, SessionRef, StatsSnapshot};
