//! Persisted presence status snapshots.
//!
//! # Invariants
//! - Snapshots are append-only; a new event produces a new row.
//! - `priority_label` is the arbitration key for later comparisons, not the
//!   provenance of the event that produced the row.

use crate::model::event::PersonId;
use crate::model::priority::PriorityLabel;
use crate::model::status::StatusLabel;
use serde::{Deserialize, Serialize};

/// Storage-assigned snapshot identity, monotonic per database.
pub type SnapshotId = i64;

/// Last persisted winning state for a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub id: SnapshotId,
    pub person_id: PersonId,
    pub status: StatusLabel,
    /// Unix epoch milliseconds of the event that produced this row.
    #[serde(rename = "ts")]
    pub timestamp_ms: i64,
    pub priority_label: PriorityLabel,
    pub reason: String,
}

/// Snapshot content before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDraft {
    pub person_id: PersonId,
    pub status: StatusLabel,
    pub timestamp_ms: i64,
    pub priority_label: PriorityLabel,
    pub reason: String,
}
