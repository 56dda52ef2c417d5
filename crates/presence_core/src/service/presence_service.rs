//! Presence resolution use-case service.
//!
//! # Responsibility
//! - Ingest events: resolve against the current snapshot, then record the
//!   event and the winning snapshot in one store call.
//! - Serve current status, status board, history and shift scheduling.
//!
//! # Invariants
//! - Fetch, evaluate, arbitrate and append run under the person's lock, and
//!   the append is guarded by the snapshot id read at the start.
//! - A repeated event id never appends a second snapshot.
//! - A failed ingestion leaves no trace, so the same event id can be retried.
//! - The service never retries; stale-snapshot conflicts surface to callers.

use crate::config::{ConfigError, PresenceConfig};
use crate::engine::arbiter::Verdict;
use crate::engine::priority_table::PriorityTable;
use crate::engine::{resolve, Candidate, Decision};
use crate::model::event::{EventId, PersonId, PresenceEvent};
use crate::model::shift::{Shift, ShiftValidationError, DEFAULT_SHIFT_GRACE_MS};
use crate::model::snapshot::{SnapshotId, StatusSnapshot};
use crate::repo::snapshot_repo::HistoryQuery;
use crate::repo::RepoError;
use crate::service::person_locks::PersonLocks;
use crate::store::PresenceStore;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const DEFAULT_LOCK_SHARDS: usize = 16;

/// Service error for presence use-cases.
#[derive(Debug)]
pub enum PresenceServiceError {
    /// Another writer appended a snapshot after this resolution read state.
    StaleSnapshot {
        person_id: PersonId,
        expected: Option<SnapshotId>,
        actual: Option<SnapshotId>,
    },
    /// Storage or collaborator failure.
    Repo(RepoError),
}

impl Display for PresenceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleSnapshot { person_id, .. } => write!(
                f,
                "current snapshot for person {person_id} changed during resolution"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PresenceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::StaleSnapshot { .. } => None,
        }
    }
}

impl From<RepoError> for PresenceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::StaleSnapshot {
                person_id,
                expected,
                actual,
            } => Self::StaleSnapshot {
                person_id,
                expected,
                actual,
            },
            other => Self::Repo(other),
        }
    }
}

impl PresenceServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::StaleSnapshot { .. } => "stale_snapshot",
            Self::Repo(_) => "repo_failed",
        }
    }
}

/// One resolved event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub event_id: EventId,
    pub shift_active: bool,
    pub rule: Option<&'static str>,
    pub candidate: Candidate,
    pub verdict: Verdict,
    pub winner: Candidate,
    /// Row appended for this event.
    pub snapshot: StatusSnapshot,
}

/// Result of `ingest_event`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Resolved(Resolution),
    /// Event id was already recorded; nothing was stored.
    Duplicate {
        event_id: EventId,
        current: Option<StatusSnapshot>,
    },
}

impl IngestOutcome {
    pub fn event_id(&self) -> &str {
        match self {
            Self::Resolved(resolution) => resolution.event_id.as_str(),
            Self::Duplicate { event_id, .. } => event_id.as_str(),
        }
    }

    /// Person's current snapshot after ingestion as far as this call knows.
    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        match self {
            Self::Resolved(resolution) => Some(&resolution.snapshot),
            Self::Duplicate { current, .. } => current.as_ref(),
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Self::Resolved(resolution) => Some(resolution),
            Self::Duplicate { .. } => None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Presence service facade over a `PresenceStore`.
pub struct PresenceService<S: PresenceStore> {
    store: S,
    table: PriorityTable,
    shift_grace_ms: i64,
    locks: PersonLocks,
}

impl<S: PresenceStore> PresenceService<S> {
    /// Default table, 10 minute grace, 16 lock shards.
    pub fn new(store: S) -> Self {
        Self::assemble(
            store,
            PriorityTable::default(),
            DEFAULT_SHIFT_GRACE_MS,
            DEFAULT_LOCK_SHARDS,
        )
    }

    /// Builds a service with explicit settings.
    ///
    /// # Errors
    /// `NegativeGrace` when `shift_grace_ms < 0`. A `lock_shards` of 0 is
    /// raised to 1.
    pub fn with_settings(
        store: S,
        table: PriorityTable,
        shift_grace_ms: i64,
        lock_shards: usize,
    ) -> Result<Self, ShiftValidationError> {
        if shift_grace_ms < 0 {
            return Err(ShiftValidationError::NegativeGrace(shift_grace_ms));
        }
        Ok(Self::assemble(store, table, shift_grace_ms, lock_shards))
    }

    pub fn from_config(store: S, config: &PresenceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(
            store,
            config.priority_table()?,
            config.shift_grace_ms(),
            config.lock_shards,
        ))
    }

    fn assemble(store: S, table: PriorityTable, shift_grace_ms: i64, lock_shards: usize) -> Self {
        Self {
            store,
            table,
            shift_grace_ms,
            locks: PersonLocks::new(lock_shards),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn priority_table(&self) -> &PriorityTable {
        &self.table
    }

    /// Records `event` and resolves it into a new snapshot.
    ///
    /// # Errors
    /// - `StaleSnapshot` when the guarded append detects a concurrent writer.
    /// - `Repo` for any storage failure.
    ///
    /// On error neither the event nor a snapshot is stored.
    pub fn ingest_event(
        &self,
        mut event: PresenceEvent,
    ) -> Result<IngestOutcome, PresenceServiceError> {
        let started_at = Instant::now();
        let event_id = event.ensure_id().to_string();
        let person_id = event.person_id;

        let _guard = self.locks.lock(person_id);
        let result = self.ingest_locked(&event, event_id);

        match &result {
            Ok(IngestOutcome::Resolved(resolution)) => info!(
                "event=presence_resolve module=service status=ok person_id={person_id} event_id={} rule={} verdict={} candidate_won={} winner={} priority={} duration_ms={}",
                resolution.event_id,
                resolution.rule.unwrap_or("none"),
                resolution.verdict.as_str(),
                resolution.verdict.candidate_won(),
                resolution.winner.status,
                resolution.winner.priority,
                started_at.elapsed().as_millis()
            ),
            Ok(IngestOutcome::Duplicate { event_id, .. }) => warn!(
                "event=presence_resolve module=service status=skipped person_id={person_id} event_id={event_id} reason=duplicate_event"
            ),
            Err(err) => error!(
                "event=presence_resolve module=service status=error person_id={person_id} error_code={} duration_ms={} error={}",
                err.code(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn ingest_locked(
        &self,
        event: &PresenceEvent,
        event_id: EventId,
    ) -> Result<IngestOutcome, PresenceServiceError> {
        let person_id = event.person_id;
        let current = self.store.latest_snapshot(person_id)?;
        let shift_active =
            self.store
                .is_shift_active(person_id, event.timestamp_ms, self.shift_grace_ms)?;

        let Decision {
            rule,
            candidate,
            verdict,
            winner,
        } = resolve(event, current.as_ref(), shift_active, &self.table);
        debug!(
            "event=presence_decide module=service person_id={person_id} shift_active={shift_active} rule={} candidate={} candidate_priority={} verdict={}",
            rule.unwrap_or("none"),
            candidate.status,
            candidate.priority,
            verdict.as_str()
        );

        let expected_prior = current.as_ref().map(|snapshot| snapshot.id);
        let draft = winner.clone().into_draft(event);
        let Some(snapshot) = self
            .store
            .record_resolution(event, &draft, expected_prior)?
        else {
            return Ok(IngestOutcome::Duplicate { event_id, current });
        };

        Ok(IngestOutcome::Resolved(Resolution {
            event_id,
            shift_active,
            rule,
            candidate,
            verdict,
            winner,
            snapshot,
        }))
    }

    /// Latest snapshot for a person, `None` if never set.
    pub fn current_status(
        &self,
        person_id: PersonId,
    ) -> Result<Option<StatusSnapshot>, PresenceServiceError> {
        Ok(self.store.latest_snapshot(person_id)?)
    }

    /// Current snapshot of every person with at least one snapshot.
    pub fn status_board(&self) -> Result<Vec<StatusSnapshot>, PresenceServiceError> {
        Ok(self.store.current_snapshots()?)
    }

    /// Snapshot history newest first, optionally bounded in time.
    pub fn status_history(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<StatusSnapshot>, PresenceServiceError> {
        Ok(self.store.snapshot_history(query)?)
    }

    /// Stores a shift and returns it with its assigned id.
    pub fn schedule_shift(&self, shift: &Shift) -> Result<Shift, PresenceServiceError> {
        let id = self.store.create_shift(shift)?;
        info!(
            "event=shift_schedule module=service status=ok person_id={} shift_id={id}",
            shift.person_id
        );
        Ok(Shift {
            id: Some(id),
            ..shift.clone()
        })
    }

    /// Whether `timestamp_ms` falls in one of the person's shifts, with grace.
    pub fn is_shift_active(
        &self,
        person_id: PersonId,
        timestamp_ms: i64,
    ) -> Result<bool, PresenceServiceError> {
        Ok(self
            .store
            .is_shift_active(person_id, timestamp_ms, self.shift_grace_ms)?)
    }
}
