//! Presence event model.
//!
//! # Responsibility
//! - Describe one raw signal received from a source (biometric reader, mobile
//!   geofence, task board, calendar, panic trigger).
//!
//! # Invariants
//! - `source` and `kind` are free text; unknown values are valid input.
//! - `payload` is carried and persisted but never inspected by resolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Numeric person identity shared with the roster owner.
pub type PersonId = i64;

/// Event identity. Callers may supply any non-empty text.
pub type EventId = String;

/// Opaque key/value payload attached to events.
pub type EventPayload = Map<String, Value>;

/// One incoming presence signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceEvent {
    /// Assigned by `PresenceService` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub person_id: PersonId,
    /// Unix epoch milliseconds.
    #[serde(rename = "ts")]
    pub timestamp_ms: i64,
    #[serde(default)]
    pub source: String,
    /// Serialized as `type` to match the ingestion schema.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub payload: EventPayload,
}

impl PresenceEvent {
    /// Creates an event without id or payload.
    pub fn new(
        person_id: PersonId,
        timestamp_ms: i64,
        source: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            person_id,
            timestamp_ms,
            source: source.into(),
            kind: kind.into(),
            payload: EventPayload::new(),
        }
    }

    /// Builder-style helper for callers that already own an id.
    pub fn with_id(mut self, id: impl Into<EventId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the event id, generating a UUID v4 when none is set.
    ///
    /// Blank ids are treated as absent.
    pub fn ensure_id(&mut self) -> &str {
        let needs_id = self
            .id
            .as_deref()
            .map_or(true, |value| value.trim().is_empty());
        if needs_id {
            self.id = Some(Uuid::new_v4().to_string());
        }
        self.id.as_deref().unwrap_or_default()
    }
}
