//! Shared repository error type.

use crate::db::DbError;
use crate::model::event::PersonId;
use crate::model::shift::ShiftValidationError;
use crate::model::snapshot::SnapshotId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for presence persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(ShiftValidationError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    /// Conditional append found a different current snapshot than expected.
    StaleSnapshot {
        person_id: PersonId,
        expected: Option<SnapshotId>,
        actual: Option<SnapshotId>,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted presence data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::StaleSnapshot {
                person_id,
                expected,
                actual,
            } => write!(
                f,
                "stale snapshot for person {person_id}: expected {}, found {}",
                describe_snapshot_id(*expected),
                describe_snapshot_id(*actual)
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ShiftValidationError> for RepoError {
    fn from(value: ShiftValidationError) -> Self {
        Self::Validation(value)
    }
}

fn describe_snapshot_id(id: Option<SnapshotId>) -> String {
    match id {
        Some(id) => format!("#{id}"),
        None => "none".to_string(),
    }
}
