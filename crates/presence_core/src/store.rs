//! Collaborator boundary consumed by the presence service.
//!
//! # Responsibility
//! - Bundle the event log, snapshot and shift repositories behind one
//!   thread-safe trait so the service stays storage-agnostic.
//!
//! # Invariants
//! - `latest_snapshot` returning `Ok(None)` means "never set", not a failure.
//! - Snapshot appends are conditional on the expected prior snapshot id.
//! - `record_resolution` stores the event and its snapshot together or not at
//!   all, so a failed resolution can be retried under the same event id.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::event::{PersonId, PresenceEvent};
use crate::model::shift::Shift;
use crate::model::snapshot::{SnapshotDraft, SnapshotId, StatusSnapshot};
use crate::repo::event_repo::{EventRepository, SqliteEventRepository};
use crate::repo::shift_repo::{ShiftRepository, SqliteShiftRepository};
use crate::repo::snapshot_repo::{
    append_guarded, HistoryQuery, SnapshotRepository, SqliteSnapshotRepository,
};
use crate::repo::RepoResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Storage operations the resolution flow depends on.
pub trait PresenceStore: Send + Sync {
    /// Atomically records `event` and appends `draft` guarded by
    /// `expected_prior`.
    ///
    /// Returns `Ok(None)` without writing anything when the event id is
    /// already recorded. On error nothing is written.
    fn record_resolution(
        &self,
        event: &PresenceEvent,
        draft: &SnapshotDraft,
        expected_prior: Option<SnapshotId>,
    ) -> RepoResult<Option<StatusSnapshot>>;
    fn latest_snapshot(&self, person_id: PersonId) -> RepoResult<Option<StatusSnapshot>>;
    fn is_shift_active(
        &self,
        person_id: PersonId,
        timestamp_ms: i64,
        grace_ms: i64,
    ) -> RepoResult<bool>;
    fn append_snapshot(
        &self,
        draft: &SnapshotDraft,
        expected_prior: Option<SnapshotId>,
    ) -> RepoResult<StatusSnapshot>;
    fn current_snapshots(&self) -> RepoResult<Vec<StatusSnapshot>>;
    fn snapshot_history(&self, query: &HistoryQuery) -> RepoResult<Vec<StatusSnapshot>>;
    fn create_shift(&self, shift: &Shift) -> RepoResult<i64>;
}

/// SQLite implementation sharing one connection across threads.
pub struct SqlitePresenceStore {
    conn: Mutex<Connection>,
}

impl SqlitePresenceStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    /// Opens `path` when set, otherwise an in-memory database.
    pub fn open_optional(path: Option<&Path>) -> DbResult<Self> {
        match path {
            Some(path) => Self::open(path),
            None => Self::open_in_memory(),
        }
    }

    // A panic while holding the lock leaves SQLite consistent: open
    // transactions roll back when dropped.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PresenceStore for SqlitePresenceStore {
    fn record_resolution(
        &self,
        event: &PresenceEvent,
        draft: &SnapshotDraft,
        expected_prior: Option<SnapshotId>,
    ) -> RepoResult<Option<StatusSnapshot>> {
        let conn = self.conn();
        let tx = Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)?;
        let events = SqliteEventRepository::try_new(&tx)?;
        if !events.insert_event(event)? {
            return Ok(None);
        }
        let snapshot = append_guarded(&tx, draft, expected_prior)?;
        tx.commit()?;
        Ok(Some(snapshot))
    }

    fn latest_snapshot(&self, person_id: PersonId) -> RepoResult<Option<StatusSnapshot>> {
        let conn = self.conn();
        let repo = SqliteSnapshotRepository::try_new(&conn)?;
        repo.latest_snapshot(person_id)
    }

    fn is_shift_active(
        &self,
        person_id: PersonId,
        timestamp_ms: i64,
        grace_ms: i64,
    ) -> RepoResult<bool> {
        let conn = self.conn();
        let repo = SqliteShiftRepository::try_new(&conn)?;
        repo.is_shift_active(person_id, timestamp_ms, grace_ms)
    }

    fn append_snapshot(
        &self,
        draft: &SnapshotDraft,
        expected_prior: Option<SnapshotId>,
    ) -> RepoResult<StatusSnapshot> {
        let conn = self.conn();
        let repo = SqliteSnapshotRepository::try_new(&conn)?;
        repo.append_snapshot(draft, expected_prior)
    }

    fn current_snapshots(&self) -> RepoResult<Vec<StatusSnapshot>> {
        let conn = self.conn();
        let repo = SqliteSnapshotRepository::try_new(&conn)?;
        repo.list_current_snapshots()
    }

    fn snapshot_history(&self, query: &HistoryQuery) -> RepoResult<Vec<StatusSnapshot>> {
        let conn = self.conn();
        let repo = SqliteSnapshotRepository::try_new(&conn)?;
        repo.list_history(query)
    }

    fn create_shift(&self, shift: &Shift) -> RepoResult<i64> {
        let conn = self.conn();
        let repo = SqliteShiftRepository::try_new(&conn)?;
        repo.create_shift(shift)
    }
}
