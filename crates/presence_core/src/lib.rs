//! Presence status resolution core.
//!
//! Resolves asynchronous presence events (biometric, geofence, task,
//! calendar, panic) into one authoritative status per person, and keeps the
//! event log, snapshot history and shift schedule in SQLite.

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, PresenceConfig};
pub use engine::arbiter::{arbitrate, Verdict};
pub use engine::priority_table::{PriorityTable, PriorityTableError};
pub use engine::rules::{derive_priority, evaluate, evaluate_traced, Evaluation};
pub use engine::{resolve, Candidate, Decision};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::event::{EventId, EventPayload, PersonId, PresenceEvent};
pub use model::priority::PriorityLabel;
pub use model::shift::{Shift, ShiftValidationError, DEFAULT_SHIFT_GRACE_MS};
pub use model::snapshot::{SnapshotDraft, SnapshotId, StatusSnapshot};
pub use model::status::StatusLabel;
pub use repo::snapshot_repo::HistoryQuery;
pub use repo::{RepoError, RepoResult};
pub use service::presence_service::{
    IngestOutcome, PresenceService, PresenceServiceError, Resolution,
};
pub use store::{PresenceStore, SqlitePresenceStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
