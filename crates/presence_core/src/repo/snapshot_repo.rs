//! Status snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Append winning snapshots and read back current/historical state.
//!
//! # Invariants
//! - Rows are never updated or deleted.
//! - "Current" means the row with the greatest `ts`, ties broken by the
//!   greatest `id` (latest insert).
//! - Appends write only when the current row id matches the caller's
//!   expectation, inside an immediate transaction.

use super::{ensure_tables, RepoError, RepoResult};
use crate::model::event::PersonId;
use crate::model::priority::PriorityLabel;
use crate::model::snapshot::{SnapshotDraft, SnapshotId, StatusSnapshot};
use crate::model::status::StatusLabel;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const SNAPSHOT_SELECT_SQL: &str = "SELECT
    id,
    person_id,
    status,
    ts,
    priority_label,
    reason
FROM status_snapshots";

/// Filters for a person's snapshot history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub person_id: PersonId,
    /// Inclusive lower bound in epoch milliseconds.
    pub from_ms: Option<i64>,
    /// Inclusive upper bound in epoch milliseconds.
    pub to_ms: Option<i64>,
    pub limit: Option<u32>,
}

impl HistoryQuery {
    pub fn for_person(person_id: PersonId) -> Self {
        Self {
            person_id,
            ..Self::default()
        }
    }
}

/// Repository interface for snapshot persistence.
pub trait SnapshotRepository {
    /// Latest snapshot for a person, `None` if none was ever written.
    fn latest_snapshot(&self, person_id: PersonId) -> RepoResult<Option<StatusSnapshot>>;
    /// Appends `draft` if the person's current snapshot id equals `expected_prior`.
    fn append_snapshot(
        &self,
        draft: &SnapshotDraft,
        expected_prior: Option<SnapshotId>,
    ) -> RepoResult<StatusSnapshot>;
    /// Current snapshot of every person, ordered by person id.
    fn list_current_snapshots(&self) -> RepoResult<Vec<StatusSnapshot>>;
    /// History newest first.
    fn list_history(&self, query: &HistoryQuery) -> RepoResult<Vec<StatusSnapshot>>;
}

/// SQLite-backed snapshot repository.
pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["status_snapshots"])?;
        Ok(Self { conn })
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn latest_snapshot(&self, person_id: PersonId) -> RepoResult<Option<StatusSnapshot>> {
        load_latest(self.conn, person_id)
    }

    fn append_snapshot(
        &self,
        draft: &SnapshotDraft,
        expected_prior: Option<SnapshotId>,
    ) -> RepoResult<StatusSnapshot> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let snapshot = append_guarded(&tx, draft, expected_prior)?;
        tx.commit()?;
        Ok(snapshot)
    }

    fn list_current_snapshots(&self) -> RepoResult<Vec<StatusSnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SNAPSHOT_SELECT_SQL} AS s
             WHERE s.id = (
                SELECT s2.id
                FROM status_snapshots s2
                WHERE s2.person_id = s.person_id
                ORDER BY s2.ts DESC, s2.id DESC
                LIMIT 1
             )
             ORDER BY s.person_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(parse_snapshot_row(row)?);
        }
        Ok(snapshots)
    }

    fn list_history(&self, query: &HistoryQuery) -> RepoResult<Vec<StatusSnapshot>> {
        let mut sql = format!("{SNAPSHOT_SELECT_SQL} WHERE person_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(query.person_id)];

        if let Some(from_ms) = query.from_ms {
            sql.push_str(" AND ts >= ?");
            bind_values.push(Value::Integer(from_ms));
        }
        if let Some(to_ms) = query.to_ms {
            sql.push_str(" AND ts <= ?");
            bind_values.push(Value::Integer(to_ms));
        }

        sql.push_str(" ORDER BY ts DESC, id DESC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(parse_snapshot_row(row)?);
        }
        Ok(snapshots)
    }
}

/// Guarded append without its own transaction.
///
/// Callers must already hold a write transaction on `conn`, otherwise the
/// check and the insert are not atomic.
pub(crate) fn append_guarded(
    conn: &Connection,
    draft: &SnapshotDraft,
    expected_prior: Option<SnapshotId>,
) -> RepoResult<StatusSnapshot> {
    let actual = latest_snapshot_id(conn, draft.person_id)?;
    if actual != expected_prior {
        return Err(RepoError::StaleSnapshot {
            person_id: draft.person_id,
            expected: expected_prior,
            actual,
        });
    }

    conn.execute(
        "INSERT INTO status_snapshots (
            person_id,
            status,
            ts,
            priority_label,
            reason
        ) VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            draft.person_id,
            draft.status.as_str(),
            draft.timestamp_ms,
            draft.priority_label.as_str(),
            draft.reason.as_str(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    debug!(
        "event=snapshot_append module=repo status=ok person_id={} snapshot_id={id}",
        draft.person_id
    );

    Ok(StatusSnapshot {
        id,
        person_id: draft.person_id,
        status: draft.status,
        timestamp_ms: draft.timestamp_ms,
        priority_label: draft.priority_label.clone(),
        reason: draft.reason.clone(),
    })
}

fn load_latest(conn: &Connection, person_id: PersonId) -> RepoResult<Option<StatusSnapshot>> {
    let mut stmt = conn.prepare(&format!(
        "{SNAPSHOT_SELECT_SQL}
         WHERE person_id = ?1
         ORDER BY ts DESC, id DESC
         LIMIT 1;"
    ))?;
    let mut rows = stmt.query([person_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_snapshot_row(row)?));
    }
    Ok(None)
}

fn latest_snapshot_id(conn: &Connection, person_id: PersonId) -> RepoResult<Option<SnapshotId>> {
    let id = conn
        .query_row(
            "SELECT id
             FROM status_snapshots
             WHERE person_id = ?1
             ORDER BY ts DESC, id DESC
             LIMIT 1;",
            [person_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(id)
}

fn parse_snapshot_row(row: &Row<'_>) -> RepoResult<StatusSnapshot> {
    let status_text: String = row.get("status")?;
    let status = StatusLabel::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in status_snapshots.status"
        ))
    })?;
    let priority_text: String = row.get("priority_label")?;

    Ok(StatusSnapshot {
        id: row.get("id")?,
        person_id: row.get("person_id")?,
        status,
        timestamp_ms: row.get("ts")?,
        priority_label: PriorityLabel::from_label(&priority_text),
        reason: row.get("reason")?,
    })
}
