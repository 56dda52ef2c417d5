//! Presence status resolution engine.
//!
//! # Responsibility
//! - Turn one event plus context into a `Candidate` (`rules`).
//! - Arbitrate a candidate against the current snapshot (`arbiter`) using an
//!   injectable precedence order (`priority_table`).
//!
//! # Invariants
//! - Every function here is pure and total: no I/O, no errors, no retries.
//! - Candidates are never persisted directly; only an arbitration winner is.

pub mod arbiter;
pub mod priority_table;
pub mod rules;

use crate::model::event::PresenceEvent;
use crate::model::priority::PriorityLabel;
use crate::model::snapshot::{SnapshotDraft, StatusSnapshot};
use crate::model::status::StatusLabel;
use serde::{Deserialize, Serialize};

/// Unpersisted status proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub status: StatusLabel,
    pub priority: PriorityLabel,
    pub reason: String,
}

impl Candidate {
    /// Re-materializes a persisted snapshot as a candidate.
    pub fn from_snapshot(snapshot: &StatusSnapshot) -> Self {
        Self {
            status: snapshot.status,
            priority: snapshot.priority_label.clone(),
            reason: snapshot.reason.clone(),
        }
    }

    /// Builds the row to persist for `event` when this candidate won.
    pub fn into_draft(self, event: &PresenceEvent) -> SnapshotDraft {
        SnapshotDraft {
            person_id: event.person_id,
            status: self.status,
            timestamp_ms: event.timestamp_ms,
            priority_label: self.priority,
            reason: self.reason,
        }
    }
}

/// Full outcome of evaluating and arbitrating one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Name of the rule that fired, `None` when defaults stood.
    pub rule: Option<&'static str>,
    pub candidate: Candidate,
    pub verdict: arbiter::Verdict,
    pub winner: Candidate,
}

/// Evaluates `event` and arbitrates the candidate against `current`.
pub fn resolve(
    event: &PresenceEvent,
    current: Option<&StatusSnapshot>,
    shift_active: bool,
    table: &priority_table::PriorityTable,
) -> Decision {
    let evaluation = rules::evaluate_traced(event, current, shift_active);
    let verdict = arbiter::verdict(&evaluation.candidate, current, event.timestamp_ms, table);
    let winner = arbiter::arbitrate(
        evaluation.candidate.clone(),
        current,
        event.timestamp_ms,
        table,
    );
    Decision {
        rule: evaluation.rule,
        candidate: evaluation.candidate,
        verdict,
        winner,
    }
}
