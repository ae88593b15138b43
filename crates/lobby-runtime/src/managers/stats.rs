//! Aggregate counters and the debounce flag for the stats publisher.
//!
//! Owned by the stats executor's worker. Counters move only by the deltas
//! queued through [`crate::StatsPublisher`]; there is no direct assignment.
//! Decrements are not floored at zero: out-of-order updates may push a
//! counter negative, and that drift is reported rather than hidden.

use lobby_core::StatsSnapshot;

/// Counter state for the debounced stats publisher.
#[derive(Debug, Default)]
pub struct StatsCounters {
    peer_count: i64,
    game_count: i64,
    /// At most one publish may be pending at a time. The flag is flipped
    /// only from inside the serialized worker, which is what removes the
    /// check-then-schedule race.
    publish_scheduled: bool,
}

impl StatsCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_peer_delta(&mut self, delta: i64) {
        self.peer_count += delta;
    }

    pub fn apply_game_delta(&mut self, delta: i64) {
        self.game_count += delta;
    }

    pub fn peer_count(&self) -> i64 {
        self.peer_count
    }

    pub fn game_count(&self) -> i64 {
        self.game_count
    }

    /// Whether a publish is already pending for the current window.
    pub fn is_publish_scheduled(&self) -> bool {
        self.publish_scheduled
    }

    /// Record that a publish has been scheduled (Idle → Scheduled).
    pub fn mark_publish_scheduled(&mut self) {
        self.publish_scheduled = true;
    }

    /// Consume the pending schedule (Scheduled → Idle).
    pub fn clear_publish_schedule(&mut self) {
        self.publish_scheduled = false;
    }

    /// Current counter values as a publishable snapshot.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            peer_count: self.peer_count,
            game_count: self.game_count,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
