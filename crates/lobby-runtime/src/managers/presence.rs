//! Presence table: who is connected to the master and which session they
//! are in.
//!
//! Owned by the presence service's serialized worker; no operation here is
//! ever called from two threads. Records live exactly as long as the player
//! is connected to the master or bound to a session. The instant both
//! conditions are gone the record is removed, not flagged.

use std::collections::HashMap;

use lobby_core::{FriendsResponse, SessionRef};
use tracing::debug;

// ----------------------------------------------------------------------------
// Presence Record
// ----------------------------------------------------------------------------

/// Presence state for a single player id.
#[derive(Debug, Clone, Default)]
pub struct PresenceRecord {
    /// Whether the player currently holds a master-server connection.
    pub connected_to_master: bool,
    /// The session the player is in, if any. Non-owning: the session's
    /// lifecycle belongs to the lobby layer.
    pub session: Option<SessionRef>,
}

impl PresenceRecord {
    /// A record may exist only while at least one condition holds.
    fn is_live(&self) -> bool {
        self.connected_to_master || self.session.is_some()
    }

    fn session_id(&self) -> &str {
        self.session.as_ref().map(SessionRef::id).unwrap_or("")
    }
}

// ----------------------------------------------------------------------------
// Presence Table
// ----------------------------------------------------------------------------

/// Map from player id to presence record.
#[derive(Debug, Default)]
pub struct PresenceTable {
    records: HashMap<String, PresenceRecord>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Mark the player as connected to the master. Creates the record on
    /// first sight; idempotent under repeated calls. Empty ids are ignored.
    pub fn connect_to_master(&mut self, player_id: &str) {
        // only peers with an id set can be tracked
        if player_id.is_empty() {
            return;
        }

        let record = self.records.entry(player_id.to_string()).or_default();
        record.connected_to_master = true;
        debug!(
            player = player_id,
            master = record.connected_to_master,
            session = record.session_id(),
            "player state changed"
        );
    }

    /// Clear the master connection. The record is removed immediately when
    /// no session membership remains. Empty and unknown ids are ignored.
    pub fn disconnect_from_master(&mut self, player_id: &str) {
        if player_id.is_empty() {
            return;
        }

        let Some(record) = self.records.get_mut(player_id) else {
            return;
        };
        record.connected_to_master = false;
        if record.is_live() {
            debug!(
                player = player_id,
                master = false,
                session = record.session_id(),
                "player state changed"
            );
            return;
        }

        self.records.remove(player_id);
        debug!(player = player_id, "player removed");
    }

    /// Bind the player to a session. A join may arrive before the master
    /// connect, so the record is created on demand. Empty ids are ignored.
    pub fn join_session(&mut self, player_id: &str, session: SessionRef) {
        if player_id.is_empty() {
            return;
        }

        let record = self.records.entry(player_id.to_string()).or_default();
        record.session = Some(session);
        debug!(
            player = player_id,
            master = record.connected_to_master,
            session = record.session_id(),
            "player state changed"
        );
    }

    /// Clear the session binding. The record is removed immediately when no
    /// master connection remains. Empty and unknown ids are ignored.
    pub fn leave_session(&mut self, player_id: &str) {
        if player_id.is_empty() {
            return;
        }

        let Some(record) = self.records.get_mut(player_id) else {
            return;
        };
        record.session = None;
        if record.is_live() {
            debug!(
                player = player_id,
                master = record.connected_to_master,
                session = "",
                "player state changed"
            );
            return;
        }

        self.records.remove(player_id);
        debug!(player = player_id, "player removed");
    }

    /// Batched presence lookup. The response mirrors the input exactly:
    /// same length, same order, unknown ids as `(false, "")`.
    pub fn lookup(&self, player_ids: &[String]) -> FriendsResponse {
        let mut response = FriendsResponse::with_capacity(player_ids.len());
        for id in player_ids {
            match self.records.get(id) {
                Some(record) => response.push(true, record.session_id().to_string()),
                None => response.push(false, String::new()),
            }
        }
        response
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_id_is_ignored() {
        let mut table = PresenceTable::new();
        table.connect_to_master("");
        table.join_session("", SessionRef::new("g1"));
        table.disconnect_from_master("");
        table.leave_session("");
        assert!(table.is_empty());
    }

    #[test]
    fn connect_is_idempotent() {
        let mut table = PresenceTable::new();
        table.connect_to_master("p1");
        table.connect_to_master("p1");
        assert_eq!(table.len(), 1);
        let response = table.lookup(&["p1".to_string()]);
        assert_eq!(response.online, vec![true]);
        assert_eq!(response.session_ids, vec![String::new()]);
    }

    #[test]
    fn disconnect_without_session_removes_record() {
        let mut table = PresenceTable::new();
        table.connect_to_master("p1");
        table.disconnect_from_master("p1");
        assert!(table.is_empty());
        let response = table.lookup(&["p1".to_string()]);
        assert_eq!(response.online, vec![false]);
    }

    #[test]
    fn session_keeps_record_alive_across_disconnect() {
        let mut table = PresenceTable::new();
        table.connect_to_master("p1");
        table.join_session("p1", SessionRef::new("gA"));
        table.disconnect_from_master("p1");

        let response = table.lookup(&["p1".to_string()]);
        assert_eq!(response.online, vec![true]);
        assert_eq!(response.session_ids, vec!["gA".to_string()]);

        table.leave_session("p1");
        assert!(table.is_empty());
    }

    #[test]
    fn join_may_precede_connect() {
        let mut table = PresenceTable::new();
        table.join_session("p1", SessionRef::new("gA"));
        assert_eq!(table.len(), 1);

        // leaving while never connected removes the record
        table.leave_session("p1");
        assert!(table.is_empty());
    }

    #[test]
    fn leave_while_connected_keeps_record() {
        let mut table = PresenceTable::new();
        table.connect_to_master("p1");
        table.join_session("p1", SessionRef::new("gA"));
        table.leave_session("p1");
        let response = table.lookup(&["p1".to_string()]);
        assert_eq!(response.online, vec![true]);
        assert_eq!(response.session_ids, vec![String::new()]);
    }

    #[test]
    fn unknown_ids_are_ignored_by_mutations() {
        let mut table = PresenceTable::new();
        table.disconnect_from_master("ghost");
        table.leave_session("ghost");
        assert!(table.is_empty());
    }

    #[test]
    fn lookup_preserves_input_order() {
        let mut table = PresenceTable::new();
        table.join_session("b", SessionRef::new("g1"));

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let response = table.lookup(&ids);
        assert_eq!(response.online, vec![false, true, false]);
        assert_eq!(
            response.session_ids,
            vec![String::new(), "g1".to_string(), String::new()]
        );
    }

    proptest! {
        /// The response mirrors the query: same length, and every known id
        /// reports online exactly where it appears, however the batch is
        /// shuffled or duplicated.
        #[test]
        fn lookup_mirrors_arbitrary_batches(
            known in proptest::collection::hash_set("[a-z]{1,8}", 0..20),
            query in proptest::collection::vec("[a-z]{1,8}", 0..40),
        ) {
            let mut table = PresenceTable::new();
            for id in &known {
                table.connect_to_master(id);
            }

            let query: Vec<String> = query;
            let response = table.lookup(&query);
            prop_assert_eq!(response.online.len(), query.len());
            prop_assert_eq!(response.session_ids.len(), query.len());
            for (i, id) in query.iter().enumerate() {
                prop_assert_eq!(response.online[i], known.contains(id));
                prop_assert_eq!(response.session_ids[i].as_str(), "");
            }
        }
    }
}
