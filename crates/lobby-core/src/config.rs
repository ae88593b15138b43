//! Centralized configuration for the lobby presence subsystem.
//!
//! All tunables live here so an embedding application configures the core
//! in one place: the stats debounce interval and the buffer sizing for the
//! reply channels handed to transport callers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{LobbyError, LobbyResult};

// ----------------------------------------------------------------------------
// Stats Configuration
// ----------------------------------------------------------------------------

/// Configuration for the debounced stats publisher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Debounce window between counter mutation and snapshot publication,
    /// in milliseconds. At most one snapshot is published per window.
    pub publish_interval_ms: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            publish_interval_ms: 1000,
        }
    }
}

impl StatsConfig {
    /// The debounce window as a `Duration`.
    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms)
    }
}

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Buffer sizing for the bounded reply channels an embedder may create for
/// friend-query responses and published snapshots.
///
/// The executor's own job queue is unbounded so producers never block; these
/// sizes only apply to outbound consumer channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Buffer size for friend-query response channels.
    pub response_buffer_size: usize,
    /// Buffer size for stats snapshot channels.
    pub snapshot_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            response_buffer_size: 64, // queries are request/response, small bursts
            snapshot_buffer_size: 16, // at most one snapshot per debounce window
        }
    }
}

// ----------------------------------------------------------------------------
// Top-level Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for a lobby runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LobbyConfig {
    pub stats: StatsConfig,
    pub channels: ChannelConfig,
}

impl LobbyConfig {
    /// Configuration preset for tests: a debounce window short enough that
    /// scenario tests observe publishes without multi-second sleeps.
    pub fn testing() -> Self {
        Self {
            stats: StatsConfig {
                publish_interval_ms: 50,
            },
            channels: ChannelConfig::default(),
        }
    }

    /// Validate the configuration, returning a description of the first
    /// problem found.
    pub fn validate(&self) -> LobbyResult<()> {
        if self.stats.publish_interval_ms == 0 {
            return Err(LobbyError::config_error(
                "stats.publish_interval_ms must be non-zero",
            ));
        }
        if self.channels.response_buffer_size == 0 {
            return Err(LobbyError::config_error(
                "channels.response_buffer_size must be non-zero",
            ));
        }
        if self.channels.snapshot_buffer_size == 0 {
            return Err(LobbyError::config_error(
                "channels.snapshot_buffer_size must be non-zero",
            ));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
