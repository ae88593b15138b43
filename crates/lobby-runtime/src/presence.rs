//! Presence service: the transport-facing front of the session-state store.
//!
//! Every public method does nothing but enqueue a job on the service's
//! serialized executor and return, so transport callbacks may call in from
//! any thread without blocking. All reads and writes of the underlying
//! [`PresenceTable`] happen on the single worker, which is the entire
//! consistency story: there are no locks to get wrong.

use lobby_core::{FriendsResponder, FriendsResponse, LobbyError, LobbyResult};
use tokio::sync::oneshot;
use tracing::warn;

use crate::executor::{ExecutorHandle, SerialExecutor};
use crate::managers::PresenceTable;
use crate::SessionRef;

// ----------------------------------------------------------------------------
// Presence Service
// ----------------------------------------------------------------------------

/// Serialized presence/session-state store.
pub struct PresenceService {
    executor: SerialExecutor<PresenceTable>,
    handle: ExecutorHandle<PresenceTable>,
}

impl PresenceService {
    /// Spawn the service with an empty table.
    pub fn new() -> Self {
        let executor = SerialExecutor::spawn("presence", PresenceTable::new());
        let handle = executor.handle();
        Self { executor, handle }
    }

    /// The player established a connection to the master server.
    pub fn on_connected_to_master(&self, player_id: impl Into<String>) {
        let player_id = player_id.into();
        self.handle
            .enqueue(move |table| table.connect_to_master(&player_id));
    }

    /// The player's master-server connection dropped.
    pub fn on_disconnected_from_master(&self, player_id: impl Into<String>) {
        let player_id = player_id.into();
        self.handle
            .enqueue(move |table| table.disconnect_from_master(&player_id));
    }

    /// The player joined a game session.
    pub fn on_joined_session(&self, player_id: impl Into<String>, session: SessionRef) {
        let player_id = player_id.into();
        self.handle
            .enqueue(move |table| table.join_session(&player_id, session));
    }

    /// The player left their game session (or their game-server connection
    /// dropped).
    pub fn on_left_session(&self, player_id: impl Into<String>) {
        let player_id = player_id.into();
        self.handle
            .enqueue(move |table| table.leave_session(&player_id));
    }

    /// Batched friend-presence query.
    ///
    /// Enqueues the lookup and returns immediately; the response is
    /// delivered later through `responder`, the caller's own response
    /// channel. A delivery failure is logged and not retried; retry
    /// ownership sits with the transport layer.
    pub fn find_friends<R>(&self, responder: R, player_ids: Vec<String>)
    where
        R: FriendsResponder + 'static,
    {
        self.handle.enqueue(move |table| {
            let response = table.lookup(&player_ids);
            if let Err(error) = responder.deliver(response) {
                warn!(%error, queried = player_ids.len(), "friend query response dropped");
            }
        });
    }

    /// Presence lookup as a future, for embedders that hold no transport
    /// response channel (and for tests).
    pub async fn query_presence(&self, player_ids: Vec<String>) -> LobbyResult<FriendsResponse> {
        let (tx, rx) = oneshot::channel();
        self.handle.enqueue(move |table| {
            let _ = tx.send(table.lookup(&player_ids));
        });
        rx.await
            .map_err(|_| LobbyError::executor("presence worker stopped"))
    }

    /// Number of live presence records, read through the queue.
    pub async fn record_count(&self) -> LobbyResult<usize> {
        let (tx, rx) = oneshot::channel();
        self.handle.enqueue(move |table| {
            let _ = tx.send(table.len());
        });
        rx.await
            .map_err(|_| LobbyError::executor("presence worker stopped"))
    }

    /// Whether the worker is still running.
    pub fn is_running(&self) -> bool {
        self.executor.is_running()
    }

    /// Stop the worker. Idempotent; queued events are dropped.
    pub fn shutdown(&mut self) {
        self.executor.shutdown();
    }
}

impl Default for PresenceService {
    fn default() -> Self {
        Self::new()
    }
}
