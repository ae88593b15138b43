//! State managers owned by the serialized workers.
//!
//! Everything in this module is single-threaded by construction: a manager
//! is moved into a [`crate::SerialExecutor`] worker and mutated only by
//! queued jobs.

mod presence;
mod stats;

pub use presence::{PresenceRecord, PresenceTable};
pub use stats::StatsCounters;
