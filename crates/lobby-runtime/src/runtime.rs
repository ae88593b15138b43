//! Runtime composition and lifecycle.
//!
//! A [`LobbyRuntime`] owns one presence service and one stats publisher,
//! built from a validated [`LobbyConfig`] and a configured stats sink. The
//! embedding transport layer keeps the runtime alive for the lifetime of
//! the master server and drives it from its I/O callbacks.

use std::sync::Arc;

use lobby_core::{LobbyConfig, LobbyError, LobbyResult, StatsSink};
use tracing::info;

use crate::presence::PresenceService;
use crate::stats::StatsPublisher;

// ----------------------------------------------------------------------------
// Runtime Builder
// ----------------------------------------------------------------------------

/// Builder for [`LobbyRuntime`].
pub struct LobbyRuntimeBuilder {
    config: LobbyConfig,
    stats_sink: Option<Arc<dyn StatsSink>>,
}

impl LobbyRuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config: LobbyConfig::default(),
            stats_sink: None,
        }
    }

    /// Use the given configuration instead of defaults.
    pub fn config(mut self, config: LobbyConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the downstream consumer for published stats snapshots.
    pub fn stats_sink(mut self, sink: impl StatsSink + 'static) -> Self {
        self.stats_sink = Some(Arc::new(sink));
        self
    }

    /// Validate the configuration and spawn the workers.
    pub fn build(self) -> LobbyResult<LobbyRuntime> {
        self.config.validate()?;
        let sink = self
            .stats_sink
            .ok_or_else(|| LobbyError::config_error("a stats sink must be configured"))?;

        let runtime = LobbyRuntime {
            presence: PresenceService::new(),
            stats: StatsPublisher::new(&self.config.stats, sink),
            config: self.config,
        };
        info!(
            publish_interval_ms = runtime.config.stats.publish_interval_ms,
            "lobby runtime started"
        );
        Ok(runtime)
    }
}

impl Default for LobbyRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Lobby Runtime
// ----------------------------------------------------------------------------

/// Composed presence subsystem: session-state store plus stats publisher.
pub struct LobbyRuntime {
    presence: PresenceService,
    stats: StatsPublisher,
    config: LobbyConfig,
}

impl LobbyRuntime {
    pub fn builder() -> LobbyRuntimeBuilder {
        LobbyRuntimeBuilder::new()
    }

    /// The presence/session-state store.
    pub fn presence(&self) -> &PresenceService {
        &self.presence
    }

    /// The aggregate-stats publisher.
    pub fn stats(&self) -> &StatsPublisher {
        &self.stats
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Whether both workers are still running.
    pub fn is_running(&self) -> bool {
        self.presence.is_running() && self.stats.is_running()
    }

    /// Stop both workers. Safe to call repeatedly; queued events and any
    /// pending publish are dropped, in-flight jobs finish.
    pub fn shutdown(&mut self) {
        let was_running = self.is_running();
        self.presence.shutdown();
        self.stats.shutdown();
        if was_running {
            info!("lobby runtime stopped");
        }
    }
}
