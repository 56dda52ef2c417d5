//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for events, snapshots
//!   and shifts.
//! - Isolate SQLite query details from the presence service.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`StaleSnapshot`, `InvalidData`)
//!   in addition to DB transport errors.
//! - "No row" is `Ok(None)`, never an error.

pub mod error;
pub mod event_repo;
pub mod shift_repo;
pub mod snapshot_repo;

pub use error::{RepoError, RepoResult};

use rusqlite::Connection;

/// Fails with `MissingRequiredTable` unless every table exists.
pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}
