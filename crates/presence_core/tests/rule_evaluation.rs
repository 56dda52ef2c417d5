use presence_core::engine::rules::reason;
use presence_core::{
    arbitrate, derive_priority, evaluate, PresenceEvent, PriorityLabel, PriorityTable,
    StatusLabel, StatusSnapshot,
};

fn event(source: &str, kind: &str, timestamp_ms: i64) -> PresenceEvent {
    PresenceEvent::new(1, timestamp_ms, source, kind)
}

fn snapshot(status: StatusLabel, priority: &str, timestamp_ms: i64) -> StatusSnapshot {
    StatusSnapshot {
        id: 10,
        person_id: 1,
        status,
        timestamp_ms,
        priority_label: PriorityLabel::from_label(priority),
        reason: "earlier".to_string(),
    }
}

#[test]
fn panic_without_snapshot_becomes_emergency() {
    let panic = event("mobile", "panic", 1_000);
    let candidate = evaluate(&panic, None, true);
    assert_eq!(candidate.status, StatusLabel::Emergency);
    assert_eq!(candidate.priority, PriorityLabel::Emergency);
    assert_eq!(candidate.reason, reason::PANIC_BUTTON);

    let winner = arbitrate(candidate.clone(), None, 1_000, &PriorityTable::default());
    assert_eq!(winner, candidate);
}

#[test]
fn task_assignment_loses_to_more_urgent_geofence_state() {
    let now = 1_000_000;
    let current = snapshot(StatusLabel::Available, "GEOFENCE", now - 60_000);
    let assigned = event("task", "assigned", now);

    let candidate = evaluate(&assigned, Some(&current), true);
    assert_eq!(candidate.status, StatusLabel::Busy);
    assert_eq!(candidate.priority, PriorityLabel::Task);
    assert_eq!(candidate.reason, reason::TASK_ASSIGNED);

    let winner = arbitrate(candidate, Some(&current), now, &PriorityTable::default());
    assert_eq!(winner.status, StatusLabel::Available);
    assert_eq!(winner.priority, PriorityLabel::Geofence);
    assert_eq!(winner.reason, "earlier");
}

#[test]
fn geofence_exit_matches_before_outside_shift() {
    let candidate = evaluate(&event("mobile", "geo_exit", 0), None, false);
    assert_eq!(candidate.status, StatusLabel::Break);
    assert_eq!(candidate.priority, PriorityLabel::Geofence);
    assert_eq!(candidate.reason, reason::GEOFENCE_EXIT);
}

#[test]
fn outside_shift_keeps_derived_priority() {
    let cases = [
        ("calendar", "reminder", PriorityLabel::Calendar),
        ("badge", "swipe", PriorityLabel::Task),
        ("mobile", "ping", PriorityLabel::Geofence),
        ("biometric", "heartbeat", PriorityLabel::Biometric),
        ("panic", "test", PriorityLabel::Emergency),
    ];
    for (source, kind, expected) in cases {
        let unknown = event(source, kind, 0);
        let candidate = evaluate(&unknown, None, false);
        assert_eq!(candidate.status, StatusLabel::OffShift, "{source}/{kind}");
        assert_eq!(candidate.reason, reason::OUTSIDE_SHIFT, "{source}/{kind}");
        assert_eq!(candidate.priority, expected, "{source}/{kind}");
        assert_eq!(candidate.priority, derive_priority(&unknown));
    }
}

#[test]
fn unmatched_event_on_shift_keeps_current_status() {
    let current = snapshot(StatusLabel::Busy, "TASK", 0);
    let candidate = evaluate(&event("calendar", "reminder", 5), Some(&current), true);
    assert_eq!(candidate.status, StatusLabel::Busy);
    assert_eq!(candidate.priority, PriorityLabel::Calendar);
    assert_eq!(candidate.reason, reason::NO_CHANGE);
}

#[test]
fn unmatched_event_without_snapshot_defaults_to_off_shift() {
    let candidate = evaluate(&event("", "", 0), None, true);
    assert_eq!(candidate.status, StatusLabel::OffShift);
    assert_eq!(candidate.priority, PriorityLabel::Task);
    assert_eq!(candidate.reason, reason::NO_CHANGE);
}

#[test]
fn panic_wins_regardless_of_shift_and_snapshot() {
    let snapshots = [
        None,
        Some(snapshot(StatusLabel::OnShift, "BIOMETRIC", 0)),
        Some(snapshot(StatusLabel::Emergency, "EMERGENCY", 0)),
        Some(snapshot(StatusLabel::Break, "whatever", 0)),
    ];
    for current in &snapshots {
        for shift_active in [true, false] {
            for source in ["mobile", "task", "biometric", ""] {
                let candidate = evaluate(&event(source, "panic", 0), current.as_ref(), shift_active);
                assert_eq!(candidate.status, StatusLabel::Emergency);
                assert_eq!(candidate.priority, PriorityLabel::Emergency);
            }
        }
    }
}

#[test]
fn panic_source_alone_only_raises_priority() {
    let candidate = evaluate(&event("panic", "pressed", 0), None, true);
    assert_eq!(candidate.status, StatusLabel::OffShift);
    assert_eq!(candidate.priority, PriorityLabel::Emergency);
    assert_eq!(candidate.reason, reason::NO_CHANGE);
}

#[test]
fn biometric_rules_set_shift_status() {
    let entry = evaluate(&event("biometric", "entry", 0), None, false);
    assert_eq!(entry.status, StatusLabel::OnShift);
    assert_eq!(entry.priority, PriorityLabel::Biometric);
    assert_eq!(entry.reason, reason::BIOMETRIC_ENTRY);

    let exit = evaluate(&event("biometric", "exit", 0), None, true);
    assert_eq!(exit.status, StatusLabel::OffShift);
    assert_eq!(exit.priority, PriorityLabel::Biometric);
    assert_eq!(exit.reason, reason::BIOMETRIC_EXIT);
}

#[test]
fn task_completion_marks_available() {
    let candidate = evaluate(&event("task", "completed", 0), None, false);
    assert_eq!(candidate.status, StatusLabel::Available);
    assert_eq!(candidate.priority, PriorityLabel::Task);
    assert_eq!(candidate.reason, reason::TASK_COMPLETED);
}

#[test]
fn geofence_entry_requires_active_shift() {
    let on_shift = evaluate(&event("mobile", "geo_enter", 0), None, true);
    assert_eq!(on_shift.status, StatusLabel::Available);
    assert_eq!(on_shift.priority, PriorityLabel::Geofence);
    assert_eq!(on_shift.reason, reason::GEOFENCE_ENTRY);

    let off_shift = evaluate(&event("mobile", "geo_enter", 0), None, false);
    assert_eq!(off_shift.status, StatusLabel::OffShift);
    assert_eq!(off_shift.priority, PriorityLabel::Geofence);
    assert_eq!(off_shift.reason, reason::OUTSIDE_SHIFT);
}

#[test]
fn geofence_entry_from_other_source_falls_through() {
    let current = snapshot(StatusLabel::Busy, "TASK", 0);
    let candidate = evaluate(&event("gps", "geo_enter", 0), Some(&current), true);
    assert_eq!(candidate.status, StatusLabel::Busy);
    assert_eq!(candidate.priority, PriorityLabel::Geofence);
    assert_eq!(candidate.reason, reason::NO_CHANGE);
}

#[test]
fn payload_never_changes_the_candidate() {
    let plain = event("task", "assigned", 0);
    let mut with_payload = plain.clone();
    with_payload
        .payload
        .insert("type".to_string(), serde_json::json!("panic"));
    with_payload
        .payload
        .insert("source".to_string(), serde_json::json!("biometric"));

    assert_eq!(
        evaluate(&plain, None, true),
        evaluate(&with_payload, None, true)
    );
}
