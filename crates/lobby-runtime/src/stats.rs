//! Debounced aggregate-stats publisher.
//!
//! Counter deltas are queued onto a dedicated serialized executor; the
//! first delta of a quiet period schedules a single publish one debounce
//! window later, and every further delta inside the window only accumulates.
//! The downstream sink therefore sees at most one snapshot per window no
//! matter how bursty the input is.

use std::sync::Arc;
use std::time::Duration;

use lobby_core::{StatsConfig, StatsSink};
use tracing::warn;

use crate::executor::{ExecutorHandle, SerialExecutor};
use crate::managers::StatsCounters;

// ----------------------------------------------------------------------------
// Stats Publisher
// ----------------------------------------------------------------------------

/// Serialized counter aggregation with debounced publication.
pub struct StatsPublisher {
    executor: SerialExecutor<StatsCounters>,
    handle: ExecutorHandle<StatsCounters>,
    publish_interval: Duration,
    sink: Arc<dyn StatsSink>,
}

impl StatsPublisher {
    /// Spawn the publisher with zeroed counters.
    pub fn new(config: &StatsConfig, sink: Arc<dyn StatsSink>) -> Self {
        let executor = SerialExecutor::spawn("stats", StatsCounters::new());
        let handle = executor.handle();
        Self {
            executor,
            handle,
            publish_interval: config.publish_interval(),
            sink,
        }
    }

    pub fn increment_peer_count(&self) {
        self.update_peer_count(1);
    }

    pub fn decrement_peer_count(&self) {
        self.update_peer_count(-1);
    }

    pub fn increment_game_count(&self) {
        self.update_game_count(1);
    }

    pub fn decrement_game_count(&self) {
        self.update_game_count(-1);
    }

    fn update_peer_count(&self, delta: i64) {
        let handle = self.handle.clone();
        let sink = self.sink.clone();
        let interval = self.publish_interval;
        self.handle.enqueue(move |counters| {
            counters.apply_peer_delta(delta);
            Self::schedule_publish(counters, &handle, interval, sink);
        });
    }

    fn update_game_count(&self, delta: i64) {
        let handle = self.handle.clone();
        let sink = self.sink.clone();
        let interval = self.publish_interval;
        self.handle.enqueue(move |counters| {
            counters.apply_game_delta(delta);
            Self::schedule_publish(counters, &handle, interval, sink);
        });
    }

    /// Idle → Scheduled edge. Runs inside the serialized worker, so the
    /// read-check-write on the schedule flag cannot race.
    fn schedule_publish(
        counters: &mut StatsCounters,
        handle: &ExecutorHandle<StatsCounters>,
        interval: Duration,
        sink: Arc<dyn StatsSink>,
    ) {
        if counters.is_publish_scheduled() {
            return;
        }
        counters.mark_publish_scheduled();

        handle.enqueue_after(interval, move |counters| {
            counters.clear_publish_schedule();
            let snapshot = counters.snapshot();
            if snapshot.has_drifted() {
                warn!(
                    peers = snapshot.peer_count,
                    games = snapshot.game_count,
                    "counter drift below zero"
                );
            }
            if let Err(error) = sink.publish(snapshot) {
                warn!(%error, "stats snapshot dropped");
            }
        });
    }

    /// Current counters, read through the queue. Does not disturb the
    /// publish schedule.
    pub async fn current_counts(&self) -> lobby_core::LobbyResult<(i64, i64)> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.handle.enqueue(move |counters| {
            let _ = tx.send((counters.peer_count(), counters.game_count()));
        });
        rx.await
            .map_err(|_| lobby_core::LobbyError::executor("stats worker stopped"))
    }

    /// Whether the worker is still running.
    pub fn is_running(&self) -> bool {
        self.executor.is_running()
    }

    /// Stop the worker. Idempotent; a pending publish is dropped.
    pub fn shutdown(&mut self) {
        self.executor.shutdown();
    }
}
