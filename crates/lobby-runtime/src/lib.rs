//! Lobby Runtime Engine
//!
//! This crate contains the engine for the lobby presence subsystem:
//! - [`SerialExecutor`]: the single-consumer task queue that turns racing
//!   producer threads into one serialized execution context
//! - [`PresenceService`]: connected/in-session tracking and batched friend
//!   queries over the serialized presence table
//! - [`StatsPublisher`]: debounced aggregate statistics publication
//! - [`LobbyRuntime`]: composition and lifecycle of the above
//!
//! `lobby-core` provides the stable API definitions; this crate provides
//! the behavior.

pub mod executor;
pub mod managers;
mod presence;
mod runtime;
mod stats;

pub use executor::{ExecutorHandle, SerialExecutor};
pub use managers::{PresenceRecord, PresenceTable, StatsCounters};
pub use presence::PresenceService;
pub use runtime::{LobbyRuntime, LobbyRuntimeBuilder};
pub use stats::StatsPublisher;

// Re-export core types for convenience
pub use lobby_core::{
    ChannelConfig, FriendsResponder, FriendsResponse, LobbyConfig, LobbyError, LobbyResult,
    SessionRef, StatsConfig, StatsSink, StatsSnapshot,
};
