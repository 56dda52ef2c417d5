//! Priority arbitration between a new candidate and the current snapshot.

use super::priority_table::PriorityTable;
use super::Candidate;
use crate::model::snapshot::StatusSnapshot;
use std::cmp::Ordering;

/// Which side won an arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No current snapshot existed.
    Uncontested,
    /// Candidate has strictly higher precedence.
    HigherPriority,
    /// Equal precedence and the event is not older than the snapshot.
    LatestWrite,
    /// Current snapshot kept; candidate discarded.
    CurrentKept,
}

impl Verdict {
    pub fn candidate_won(self) -> bool {
        !matches!(self, Self::CurrentKept)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncontested => "uncontested",
            Self::HigherPriority => "higher_priority",
            Self::LatestWrite => "latest_write",
            Self::CurrentKept => "current_kept",
        }
    }
}

/// Decides which side wins without building the winner.
pub fn verdict(
    candidate: &Candidate,
    current: Option<&StatusSnapshot>,
    event_timestamp_ms: i64,
    table: &PriorityTable,
) -> Verdict {
    let Some(current) = current else {
        return Verdict::Uncontested;
    };

    match table.compare(&candidate.priority, &current.priority_label) {
        Ordering::Less => Verdict::HigherPriority,
        Ordering::Equal if event_timestamp_ms >= current.timestamp_ms => Verdict::LatestWrite,
        _ => Verdict::CurrentKept,
    }
}

/// Returns the winner between `candidate` and `current`.
///
/// When the current snapshot wins, the result is synthesized from it, so its
/// `priority_label` carries forward as the key for future arbitration.
pub fn arbitrate(
    candidate: Candidate,
    current: Option<&StatusSnapshot>,
    event_timestamp_ms: i64,
    table: &PriorityTable,
) -> Candidate {
    match (verdict(&candidate, current, event_timestamp_ms, table), current) {
        (Verdict::CurrentKept, Some(current)) => Candidate::from_snapshot(current),
        _ => candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::{arbitrate, verdict, Verdict};
    use crate::engine::priority_table::PriorityTable;
    use crate::engine::Candidate;
    use crate::model::priority::PriorityLabel;
    use crate::model::snapshot::StatusSnapshot;
    use crate::model::status::StatusLabel;

    fn snapshot(priority: PriorityLabel, timestamp_ms: i64) -> StatusSnapshot {
        StatusSnapshot {
            id: 1,
            person_id: 1,
            status: StatusLabel::Available,
            timestamp_ms,
            priority_label: priority,
            reason: "geofence entry".to_string(),
        }
    }

    fn candidate(priority: PriorityLabel) -> Candidate {
        Candidate {
            status: StatusLabel::Busy,
            priority,
            reason: "task assigned".to_string(),
        }
    }

    #[test]
    fn verdict_names_each_branch() {
        let table = PriorityTable::default();
        let current = snapshot(PriorityLabel::Geofence, 100);
        assert_eq!(
            verdict(&candidate(PriorityLabel::Task), None, 0, &table),
            Verdict::Uncontested
        );
        assert_eq!(
            verdict(&candidate(PriorityLabel::Biometric), Some(&current), 0, &table),
            Verdict::HigherPriority
        );
        assert_eq!(
            verdict(&candidate(PriorityLabel::Geofence), Some(&current), 100, &table),
            Verdict::LatestWrite
        );
        assert_eq!(
            verdict(&candidate(PriorityLabel::Geofence), Some(&current), 99, &table),
            Verdict::CurrentKept
        );
        assert!(!Verdict::CurrentKept.candidate_won());
    }

    #[test]
    fn losing_candidate_is_replaced_by_current_fields() {
        let table = PriorityTable::default();
        let current = snapshot(PriorityLabel::Geofence, 100);
        let winner = arbitrate(candidate(PriorityLabel::Task), Some(&current), 200, &table);
        assert_eq!(winner.status, StatusLabel::Available);
        assert_eq!(winner.priority, PriorityLabel::Geofence);
        assert_eq!(winner.reason, "geofence entry");
    }
}
