//! Raw presence event log.
//!
//! # Responsibility
//! - Keep every ingested event as received, keyed by event id.
//!
//! # Invariants
//! - Inserts are idempotent per id: a repeated id is ignored, not overwritten.
//! - `payload` is stored as JSON object text.

use super::{ensure_tables, RepoError, RepoResult};
use crate::model::event::{EventPayload, PersonId, PresenceEvent};
use rusqlite::{params, Connection, Row};

const EVENT_SELECT_SQL: &str = "SELECT
    id,
    person_id,
    ts,
    source,
    type,
    payload
FROM presence_events";

/// Repository interface for the raw event log.
pub trait EventRepository {
    /// Returns `false` when an event with the same id already exists.
    fn insert_event(&self, event: &PresenceEvent) -> RepoResult<bool>;
    fn get_event(&self, id: &str) -> RepoResult<Option<PresenceEvent>>;
    /// Events for a person ordered by `ts ASC, id ASC`.
    fn list_events_for_person(&self, person_id: PersonId) -> RepoResult<Vec<PresenceEvent>>;
}

/// SQLite-backed event log.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["presence_events"])?;
        Ok(Self { conn })
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn insert_event(&self, event: &PresenceEvent) -> RepoResult<bool> {
        let id = event
            .id
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| RepoError::InvalidData("event id is required".to_string()))?;
        let payload = serde_json::to_string(&event.payload)
            .map_err(|err| RepoError::InvalidData(format!("unserializable payload: {err}")))?;

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO presence_events (
                id,
                person_id,
                ts,
                source,
                type,
                payload
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id,
                event.person_id,
                event.timestamp_ms,
                event.source.as_str(),
                event.kind.as_str(),
                payload,
            ],
        )?;
        Ok(changed == 1)
    }

    fn get_event(&self, id: &str) -> RepoResult<Option<PresenceEvent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn list_events_for_person(&self, person_id: PersonId) -> RepoResult<Vec<PresenceEvent>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL} WHERE person_id = ?1 ORDER BY ts ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([person_id])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<PresenceEvent> {
    let payload_text: String = row.get("payload")?;
    let payload: EventPayload = serde_json::from_str(&payload_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid payload json in presence_events.payload: {err}"
        ))
    })?;

    Ok(PresenceEvent {
        id: Some(row.get("id")?),
        person_id: row.get("person_id")?,
        timestamp_ms: row.get("ts")?,
        source: row.get("source")?,
        kind: row.get("type")?,
        payload,
    })
}
