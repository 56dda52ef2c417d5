//! Presence status vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Closed set of presence states a person can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusLabel {
    Emergency,
    OnShift,
    OffShift,
    Busy,
    Available,
    Break,
}

impl StatusLabel {
    /// All labels in declaration order.
    pub const ALL: [StatusLabel; 6] = [
        Self::Emergency,
        Self::OnShift,
        Self::OffShift,
        Self::Busy,
        Self::Available,
        Self::Break,
    ];

    /// Stable storage/wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::OnShift => "ON_SHIFT",
            Self::OffShift => "OFF_SHIFT",
            Self::Busy => "BUSY",
            Self::Available => "AVAILABLE",
            Self::Break => "BREAK",
        }
    }

    /// Parses the storage representation. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|label| label.as_str() == value)
    }
}

impl Display for StatusLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
