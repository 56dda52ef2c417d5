//! Ordered precedence of priority labels.

use crate::model::priority::PriorityLabel;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised when building a custom table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityTableError {
    Empty,
    DuplicateLabel(PriorityLabel),
}

impl Display for PriorityTableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "priority table must contain at least one label"),
            Self::DuplicateLabel(label) => write!(f, "duplicate priority label `{label}`"),
        }
    }
}

impl Error for PriorityTableError {}

/// Total precedence order, highest first.
///
/// Labels missing from the table share the lowest rank, `len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    order: Vec<PriorityLabel>,
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            order: PriorityLabel::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl PriorityTable {
    /// Builds a table from labels ordered highest precedence first.
    pub fn new(order: Vec<PriorityLabel>) -> Result<Self, PriorityTableError> {
        if order.is_empty() {
            return Err(PriorityTableError::Empty);
        }
        for (idx, label) in order.iter().enumerate() {
            if order[..idx].contains(label) {
                return Err(PriorityTableError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { order })
    }

    /// Builds a table from raw label text, e.g. configuration values.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, PriorityTableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            labels
                .into_iter()
                .map(|label| PriorityLabel::from_label(label.as_ref()))
                .collect(),
        )
    }

    /// Position of `label`; unknown labels rank at `len()`.
    pub fn rank(&self, label: &PriorityLabel) -> usize {
        self.order
            .iter()
            .position(|entry| entry == label)
            .unwrap_or(self.order.len())
    }

    /// `Less` means `a` takes precedence over `b`.
    pub fn compare(&self, a: &PriorityLabel, b: &PriorityLabel) -> Ordering {
        self.rank(a).cmp(&self.rank(b))
    }

    pub fn labels(&self) -> &[PriorityLabel] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{PriorityTable, PriorityTableError};
    use crate::model::priority::PriorityLabel;
    use std::cmp::Ordering;

    #[test]
    fn default_ranks_follow_declared_order() {
        let table = PriorityTable::default();
        assert_eq!(table.rank(&PriorityLabel::Emergency), 0);
        assert_eq!(table.rank(&PriorityLabel::Biometric), 1);
        assert_eq!(table.rank(&PriorityLabel::Geofence), 2);
        assert_eq!(table.rank(&PriorityLabel::Task), 3);
        assert_eq!(table.rank(&PriorityLabel::Calendar), 4);
        assert_eq!(table.rank(&PriorityLabel::from_label("")), 5);
        assert_eq!(table.rank(&PriorityLabel::from_label("SOMETHING")), 5);
    }

    #[test]
    fn compare_is_a_strict_total_order_over_known_labels() {
        let table = PriorityTable::default();
        let mut labels = PriorityLabel::DEFAULT_ORDER.to_vec();
        labels.push(PriorityLabel::from_label("other"));
        for (i, a) in labels.iter().enumerate() {
            for (j, b) in labels.iter().enumerate() {
                assert_eq!(table.compare(a, b), i.cmp(&j), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn unknown_labels_tie_with_each_other() {
        let table = PriorityTable::default();
        let a = PriorityLabel::from_label("x");
        let b = PriorityLabel::from_label("y");
        assert_eq!(table.compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn new_rejects_empty_and_duplicates() {
        assert_eq!(PriorityTable::new(Vec::new()), Err(PriorityTableError::Empty));
        assert_eq!(
            PriorityTable::from_labels(["TASK", "GEOFENCE", "TASK"]),
            Err(PriorityTableError::DuplicateLabel(PriorityLabel::Task))
        );
    }

    #[test]
    fn custom_order_changes_ranks() {
        let table = PriorityTable::from_labels(["CALENDAR", "TASK"]).unwrap();
        assert_eq!(table.rank(&PriorityLabel::Calendar), 0);
        assert_eq!(table.rank(&PriorityLabel::Task), 1);
        assert_eq!(table.rank(&PriorityLabel::Emergency), 2);
    }
}
