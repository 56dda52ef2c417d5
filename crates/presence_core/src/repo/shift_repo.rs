//! Shift schedule repository; answers the shift-active question.

use super::{ensure_tables, RepoResult};
use crate::model::event::PersonId;
use crate::model::shift::{Shift, ShiftValidationError};
use rusqlite::{params, Connection};

/// Repository interface for shift schedules.
pub trait ShiftRepository {
    /// Validates and stores a shift, returning its id.
    fn create_shift(&self, shift: &Shift) -> RepoResult<i64>;
    /// True if any shift covers `timestamp_ms` within `[start, end + grace_ms]`.
    fn is_shift_active(
        &self,
        person_id: PersonId,
        timestamp_ms: i64,
        grace_ms: i64,
    ) -> RepoResult<bool>;
    fn list_shifts_for_person(&self, person_id: PersonId) -> RepoResult<Vec<Shift>>;
}

pub struct SqliteShiftRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteShiftRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["shifts"])?;
        Ok(Self { conn })
    }
}

impl ShiftRepository for SqliteShiftRepository<'_> {
    fn create_shift(&self, shift: &Shift) -> RepoResult<i64> {
        shift.validate()?;
        self.conn.execute(
            "INSERT INTO shifts (person_id, start_ts, end_ts) VALUES (?1, ?2, ?3);",
            params![shift.person_id, shift.start_ms, shift.end_ms],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn is_shift_active(
        &self,
        person_id: PersonId,
        timestamp_ms: i64,
        grace_ms: i64,
    ) -> RepoResult<bool> {
        if grace_ms < 0 {
            return Err(ShiftValidationError::NegativeGrace(grace_ms).into());
        }

        let active: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM shifts
                WHERE person_id = ?1
                  AND start_ts <= ?2
                  AND (end_ts IS NULL OR end_ts >= ?3)
            );",
            params![person_id, timestamp_ms, timestamp_ms.saturating_sub(grace_ms)],
            |row| row.get(0),
        )?;
        Ok(active == 1)
    }

    fn list_shifts_for_person(&self, person_id: PersonId) -> RepoResult<Vec<Shift>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, person_id, start_ts, end_ts
             FROM shifts
             WHERE person_id = ?1
             ORDER BY start_ts ASC, id ASC;",
        )?;
        let mut rows = stmt.query([person_id])?;
        let mut shifts = Vec::new();
        while let Some(row) = rows.next()? {
            shifts.push(Shift {
                id: Some(row.get("id")?),
                person_id: row.get("person_id")?,
                start_ms: row.get("start_ts")?,
                end_ms: row.get("end_ts")?,
            });
        }
        Ok(shifts)
    }
}
