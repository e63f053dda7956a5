//! Custom assertion helpers for E2E tests.

use tp_protocol::ipc::Event;
use tp_protocol::job_models::JobStatus;
use tp_protocol::pipeline_models::Stage;

/// Stages announced by `StageStarted` events, in arrival order.
pub fn stages_started(events: &[Event]) -> Vec<Stage> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::StageStarted { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect()
}

/// Whether the events contain a status update to `status`.
#[allow(dead_code)]
pub fn has_status_update(events: &[Event], status: JobStatus) -> bool {
    events.iter().any(|e| {
        matches!(
            e,
            Event::JobStatusUpdate {
                status: s,
                ..
            } if *s == status
        )
    })
}

/// Assert the lifecycle framing of a job's events.
///
/// Checks that:
/// 1. JobStarted comes first
/// 2. Exactly one terminal event is present, and it comes last
pub fn assert_event_sequence(events: &[Event]) {
    assert!(!events.is_empty(), "Event sequence is empty");

    assert!(
        matches!(events[0], Event::JobStarted { .. }),
        "First event should be JobStarted, got: {:?}",
        events[0]
    );

    let terminal = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminal, 1, "Expected exactly one terminal event");

    let last = events.last().unwrap();
    assert!(
        last.is_terminal(),
        "Last event should be terminal, got: {last:?}"
    );
}
