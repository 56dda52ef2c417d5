//! Priority labels used as the arbitration key.
//!
//! # Invariants
//! - The five known labels round-trip through `as_str`/`from_label` exactly.
//! - Any other text is preserved verbatim as `Unrecognized` and never rejected;
//!   it ranks below every label present in a `PriorityTable`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Arbitration category attached to candidates and persisted snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PriorityLabel {
    Emergency,
    Biometric,
    Geofence,
    Task,
    Calendar,
    /// Label outside the known vocabulary, e.g. legacy rows or empty text.
    Unrecognized(String),
}

impl PriorityLabel {
    /// Built-in precedence, highest first.
    pub const DEFAULT_ORDER: [PriorityLabel; 5] = [
        Self::Emergency,
        Self::Biometric,
        Self::Geofence,
        Self::Task,
        Self::Calendar,
    ];

    /// Maps raw text to a label. Exact, case-sensitive match.
    pub fn from_label(value: &str) -> Self {
        match value {
            "EMERGENCY" => Self::Emergency,
            "BIOMETRIC" => Self::Biometric,
            "GEOFENCE" => Self::Geofence,
            "TASK" => Self::Task,
            "CALENDAR" => Self::Calendar,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Biometric => "BIOMETRIC",
            Self::Geofence => "GEOFENCE",
            Self::Task => "TASK",
            Self::Calendar => "CALENDAR",
            Self::Unrecognized(value) => value.as_str(),
        }
    }

    /// Returns whether this label belongs to the known vocabulary.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unrecognized(_))
    }
}

impl From<String> for PriorityLabel {
    fn from(value: String) -> Self {
        Self::from_label(value.as_str())
    }
}

impl From<&str> for PriorityLabel {
    fn from(value: &str) -> Self {
        Self::from_label(value)
    }
}

impl From<PriorityLabel> for String {
    fn from(value: PriorityLabel) -> Self {
        match value {
            PriorityLabel::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for PriorityLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::PriorityLabel;

    #[test]
    fn known_labels_roundtrip_through_text() {
        for label in PriorityLabel::DEFAULT_ORDER {
            assert!(label.is_known());
            assert_eq!(PriorityLabel::from_label(label.as_str()), label);
        }
    }

    #[test]
    fn unknown_text_is_preserved() {
        let label = PriorityLabel::from_label("vendor_x");
        assert_eq!(label, PriorityLabel::Unrecognized("vendor_x".to_string()));
        assert_eq!(label.as_str(), "vendor_x");
        assert!(!label.is_known());
        assert!(!PriorityLabel::from_label("task").is_known());
    }

    #[test]
    fn serde_uses_plain_strings() {
        let json = serde_json::to_string(&PriorityLabel::Geofence).unwrap();
        assert_eq!(json, "\"GEOFENCE\"");
        let parsed: PriorityLabel = serde_json::from_str("\"LEGACY\"").unwrap();
        assert_eq!(parsed, PriorityLabel::Unrecognized("LEGACY".to_string()));
    }
}
