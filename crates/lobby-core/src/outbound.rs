//! Delivery seams between the serialized core and the outside world.
//!
//! Results are handed off through these traits from inside the serialized
//! worker, so implementations must not block: the provided tokio channel
//! impls use `send`/`try_send` on already-open channels. Retry on failure
//! belongs to the transport layer, never to this core.

use tokio::sync::mpsc;

use crate::errors::{DeliveryError, LobbyResult};
use crate::types::{FriendsResponse, StatsSnapshot};

// ----------------------------------------------------------------------------
// Friend Query Responses
// ----------------------------------------------------------------------------

/// Per-caller response channel for a friend-presence query.
///
/// The transport layer owns the concrete channel; the core calls `deliver`
/// exactly once per query, from inside the serialized worker.
pub trait FriendsResponder: Send {
    fn deliver(self, response: FriendsResponse) -> LobbyResult<()>;
}

impl FriendsResponder for mpsc::UnboundedSender<FriendsResponse> {
    fn deliver(self, response: FriendsResponse) -> LobbyResult<()> {
        self.send(response)
            .map_err(|_| DeliveryError::ResponderClosed.into())
    }
}

impl FriendsResponder for tokio::sync::oneshot::Sender<FriendsResponse> {
    fn deliver(self, response: FriendsResponse) -> LobbyResult<()> {
        self.send(response)
            .map_err(|_| DeliveryError::ResponderClosed.into())
    }
}

// ----------------------------------------------------------------------------
// Stats Snapshots
// ----------------------------------------------------------------------------

/// Downstream consumer of published stats snapshots.
///
/// One sink is configured per runtime; it receives at most one snapshot per
/// debounce window. `publish` is called from inside the serialized worker
/// and must return immediately.
pub trait StatsSink: Send + Sync {
    fn publish(&self, snapshot: StatsSnapshot) -> LobbyResult<()>;
}

impl StatsSink for mpsc::UnboundedSender<StatsSnapshot> {
    fn publish(&self, snapshot: StatsSnapshot) -> LobbyResult<()> {
        self.send(snapshot)
            .map_err(|e| DeliveryError::SinkRejected {
                reason: format!("snapshot channel closed: {}", e),
            }
            .into())
    }
}

impl StatsSink for mpsc::Sender<StatsSnapshot> {
    fn publish(&self, snapshot: StatsSnapshot) -> LobbyResult<()> {
        self.try_send(snapshot)
            .map_err(|e| DeliveryError::SinkRejected {
                reason: format!("snapshot channel unavailable: {}", e),
            }
            .into())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_responder_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let response = FriendsResponse {
            online: vec![true],
            session_ids: vec!["g1".to_string()],
        };
        tx.deliver(response.clone()).unwrap();
        assert_eq!(rx.recv().await.unwrap(), response);
    }

    #[tokio::test]
    async fn oneshot_responder_delivers_once() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        tx.deliver(FriendsResponse::default()).unwrap();
        assert_eq!(rx.await.unwrap(), FriendsResponse::default());
    }

    #[tokio::test]
    async fn closed_sink_reports_rejection() {
        let (tx, rx) = mpsc::unbounded_channel::<StatsSnapshot>();
        drop(rx);
        let err = tx.publish(StatsSnapshot::default()).unwrap_err();
        assert!(err.to_string().contains("snapshot channel closed"));
    }
}
