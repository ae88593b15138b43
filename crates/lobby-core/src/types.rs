//! Payload types exchanged between the presence core and the transport layer.
//!
//! All results leaving the serialized core flow through these types. They
//! carry serde derives so an embedding application can encode them onto its
//! own wire format; this crate itself never touches the wire.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Session Reference
// ----------------------------------------------------------------------------

/// Non-owning handle to a game session owned by the transport/lobby layer.
///
/// The presence core only stores the association between a player and a
/// session; it never creates or destroys the session itself. Cloning is
/// cheap (the id is a shared `Arc<str>`), so a record and the externally
/// owned session object can point at the same id allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRef {
    id: Arc<str>,
}

impl SessionRef {
    /// Create a handle for the session with the given external id.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self { id: id.into() }
    }

    /// The session's external id.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for SessionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl From<&str> for SessionRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SessionRef {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

// ----------------------------------------------------------------------------
// Friend Presence Response
// ----------------------------------------------------------------------------

/// Result of a batched friend-presence lookup.
///
/// Two parallel sequences with the same length and element order as the
/// queried id list: `online[i]` is whether a presence record exists for
/// `ids[i]`, and `session_ids[i]` is the id of the session that player is
/// in, or the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendsResponse {
    pub online: Vec<bool>,
    pub session_ids: Vec<String>,
}

impl FriendsResponse {
    /// Pre-allocate a response for a query of `len` ids.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            online: Vec::with_capacity(len),
            session_ids: Vec::with_capacity(len),
        }
    }

    /// Append one `(online, session_id)` entry.
    pub fn push(&mut self, online: bool, session_id: String) {
        self.online.push(online);
        self.session_ids.push(session_id);
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Stats Snapshot
// ----------------------------------------------------------------------------

/// Aggregate statistics published to the downstream sink, at most once per
/// debounce window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Number of peers currently connected to the master.
    pub peer_count: i64,
    /// Number of game sessions currently active.
    pub game_count: i64,
}

impl StatsSnapshot {
    /// Whether either counter has drifted below zero.
    ///
    /// Decrements are not floored at zero: transiently out-of-order updates
    /// may push a counter negative, and the drift is surfaced to observers
    /// rather than absorbed.
    pub fn has_drifted(&self) -> bool {
        self.peer_count < 0 || self.game_count < 0
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peers={} games={}", self.peer_count, self.game_count)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ref_shares_id_allocation() {
        let id: Arc<str> = Arc::from("game-42");
        let a = SessionRef::new(id.clone());
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.id(), "game-42");
        assert_eq!(format!("{}", a), "game-42");
    }

    #[test]
    fn friends_response_stays_parallel() {
        let mut response = FriendsResponse::with_capacity(2);
        response.push(true, "g1".to_string());
        response.push(false, String::new());
        assert_eq!(response.len(), 2);
        assert_eq!(response.online, vec![true, false]);
        assert_eq!(response.session_ids, vec!["g1".to_string(), String::new()]);
    }

    #[test]
    fn snapshot_drift_detection() {
        let ok = StatsSnapshot {
            peer_count: 3,
            game_count: 0,
        };
        assert!(!ok.has_drifted());

        let drifted = StatsSnapshot {
            peer_count: 1,
            game_count: -2,
        };
        assert!(drifted.has_drifted());
    }

    #[test]
    fn snapshot_serialization() {
        let snapshot = StatsSnapshot {
            peer_count: 7,
            game_count: 2,
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StatsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
