//! Ordered first-match rule chain that turns one event into a candidate.
//!
//! # Invariants
//! - Rules are evaluated in `RULE_CHAIN` order; the first match wins and no
//!   later rule is consulted.
//! - A rule without a priority keeps the default `derive_priority(event)`.
//! - Evaluation is total: unknown or empty `source`/`kind` never fail.

use super::Candidate;
use crate::model::event::PresenceEvent;
use crate::model::priority::PriorityLabel;
use crate::model::snapshot::StatusSnapshot;
use crate::model::status::StatusLabel;

/// Fixed human-readable reasons recorded on snapshots.
pub mod reason {
    pub const NO_CHANGE: &str = "no change";
    pub const PANIC_BUTTON: &str = "panic button";
    pub const BIOMETRIC_ENTRY: &str = "biometric entry";
    pub const BIOMETRIC_EXIT: &str = "biometric exit";
    pub const TASK_ASSIGNED: &str = "task assigned";
    pub const TASK_COMPLETED: &str = "task completed";
    pub const GEOFENCE_ENTRY: &str = "geofence entry";
    pub const GEOFENCE_EXIT: &str = "geofence exit";
    pub const OUTSIDE_SHIFT: &str = "outside shift";
}

/// Inputs visible to rule predicates.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub event: &'a PresenceEvent,
    pub shift_active: bool,
}

/// One `(predicate, outcome)` entry of the chain.
pub struct Rule {
    pub name: &'static str,
    matches: fn(&RuleContext<'_>) -> bool,
    pub status: StatusLabel,
    /// `None` keeps the derived default priority.
    pub priority: Option<PriorityLabel>,
    pub reason: &'static str,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("priority", &self.priority)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl Rule {
    pub fn matches(&self, ctx: &RuleContext<'_>) -> bool {
        (self.matches)(ctx)
    }

    fn apply(&self, candidate: &mut Candidate) {
        candidate.status = self.status;
        if let Some(priority) = &self.priority {
            candidate.priority = priority.clone();
        }
        candidate.reason = self.reason.to_string();
    }
}

pub static RULE_CHAIN: [Rule; 8] = [
    Rule {
        name: "panic",
        matches: |ctx| ctx.event.kind == "panic",
        status: StatusLabel::Emergency,
        priority: Some(PriorityLabel::Emergency),
        reason: reason::PANIC_BUTTON,
    },
    Rule {
        name: "biometric_entry",
        matches: |ctx| ctx.event.source == "biometric" && ctx.event.kind == "entry",
        status: StatusLabel::OnShift,
        priority: Some(PriorityLabel::Biometric),
        reason: reason::BIOMETRIC_ENTRY,
    },
    Rule {
        name: "biometric_exit",
        matches: |ctx| ctx.event.source == "biometric" && ctx.event.kind == "exit",
        status: StatusLabel::OffShift,
        priority: Some(PriorityLabel::Biometric),
        reason: reason::BIOMETRIC_EXIT,
    },
    Rule {
        name: "task_assigned",
        matches: |ctx| ctx.event.source == "task" && ctx.event.kind == "assigned",
        status: StatusLabel::Busy,
        priority: Some(PriorityLabel::Task),
        reason: reason::TASK_ASSIGNED,
    },
    Rule {
        name: "task_completed",
        matches: |ctx| ctx.event.source == "task" && ctx.event.kind == "completed",
        status: StatusLabel::Available,
        priority: Some(PriorityLabel::Task),
        reason: reason::TASK_COMPLETED,
    },
    Rule {
        name: "geofence_entry",
        matches: |ctx| {
            ctx.event.source == "mobile" && ctx.event.kind == "geo_enter" && ctx.shift_active
        },
        status: StatusLabel::Available,
        priority: Some(PriorityLabel::Geofence),
        reason: reason::GEOFENCE_ENTRY,
    },
    Rule {
        name: "geofence_exit",
        matches: |ctx| ctx.event.kind == "geo_exit",
        status: StatusLabel::Break,
        priority: Some(PriorityLabel::Geofence),
        reason: reason::GEOFENCE_EXIT,
    },
    Rule {
        name: "outside_shift",
        matches: |ctx| !ctx.shift_active,
        status: StatusLabel::OffShift,
        priority: None,
        reason: reason::OUTSIDE_SHIFT,
    },
];

/// Candidate plus the name of the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub candidate: Candidate,
    /// `None` when no rule matched and the defaults stand.
    pub rule: Option<&'static str>,
}

/// Default priority for an event when no rule overrides it.
pub fn derive_priority(event: &PresenceEvent) -> PriorityLabel {
    let source = event.source.as_str();
    let kind = event.kind.as_str();
    if kind == "panic" || source == "panic" {
        PriorityLabel::Emergency
    } else if source == "biometric" {
        PriorityLabel::Biometric
    } else if source == "mobile" || kind.starts_with("geo_") {
        PriorityLabel::Geofence
    } else if source == "task" {
        PriorityLabel::Task
    } else if source == "calendar" {
        PriorityLabel::Calendar
    } else {
        PriorityLabel::Task
    }
}

/// Maps an event, the current snapshot and the shift flag to a candidate.
pub fn evaluate(
    event: &PresenceEvent,
    current: Option<&StatusSnapshot>,
    shift_active: bool,
) -> Candidate {
    evaluate_traced(event, current, shift_active).candidate
}

/// Same as [`evaluate`], also reporting which rule fired.
pub fn evaluate_traced(
    event: &PresenceEvent,
    current: Option<&StatusSnapshot>,
    shift_active: bool,
) -> Evaluation {
    let mut candidate = Candidate {
        status: current.map_or(StatusLabel::OffShift, |snapshot| snapshot.status),
        priority: derive_priority(event),
        reason: reason::NO_CHANGE.to_string(),
    };

    let ctx = RuleContext {
        event,
        shift_active,
    };
    let fired = RULE_CHAIN.iter().find(|rule| rule.matches(&ctx));
    if let Some(rule) = fired {
        rule.apply(&mut candidate);
    }

    Evaluation {
        candidate,
        rule: fired.map(|rule| rule.name),
    }
}
