//! Shift schedule model used to answer "is this person on shift".

use crate::model::event::PersonId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Grace window after a shift's nominal end during which it still counts.
pub const DEFAULT_SHIFT_GRACE_MS: i64 = 10 * 60 * 1000;

/// One scheduled work period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// `None` until persisted.
    #[serde(default)]
    pub id: Option<i64>,
    pub person_id: PersonId,
    /// Unix epoch milliseconds.
    pub start_ms: i64,
    /// Open-ended when `None`.
    pub end_ms: Option<i64>,
}

/// Validation failures for shift records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftValidationError {
    EndBeforeStart { start_ms: i64, end_ms: i64 },
    NegativeGrace(i64),
}

impl Display for ShiftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndBeforeStart { start_ms, end_ms } => {
                write!(f, "shift end {end_ms} is earlier than start {start_ms}")
            }
            Self::NegativeGrace(value) => write!(f, "shift grace must be >= 0, got {value}"),
        }
    }
}

impl Error for ShiftValidationError {}

impl Shift {
    pub fn new(person_id: PersonId, start_ms: i64, end_ms: Option<i64>) -> Self {
        Self {
            id: None,
            person_id,
            start_ms,
            end_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ShiftValidationError> {
        if let Some(end_ms) = self.end_ms {
            if end_ms < self.start_ms {
                return Err(ShiftValidationError::EndBeforeStart {
                    start_ms: self.start_ms,
                    end_ms,
                });
            }
        }
        Ok(())
    }

    /// Returns whether `timestamp_ms` lies in `[start, end + grace]`.
    ///
    /// Mirrors the SQL predicate used by the shift repository.
    pub fn covers(&self, timestamp_ms: i64, grace_ms: i64) -> bool {
        if timestamp_ms < self.start_ms {
            return false;
        }
        match self.end_ms {
            Some(end_ms) => end_ms >= timestamp_ms.saturating_sub(grace_ms),
            None => true,
        }
    }
}
