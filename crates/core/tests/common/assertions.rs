//! Custom assertion helpers for E2E tests.

use rk_protocol::{Event, StepName};

/// Whether the event sequence contains a WorkflowStarted event.
pub fn has_workflow_started(events: &[Event]) -> bool {
    events.iter().any(|e| matches!(e, Event::WorkflowStarted { .. }))
}

/// Whether the sequence contains a completed event for the given step.
pub fn has_step_completed(events: &[Event], step: StepName) -> bool {
    events
        .iter()
        .any(|e| matches!(e, Event::StepCompleted { step: s, .. } if *s == step))
}

/// Whether the sequence contains a failed event for the given step.
pub fn has_step_failed(events: &[Event], step: StepName) -> bool {
    events
        .iter()
        .any(|e| matches!(e, Event::StepFailed { step: s, .. } if *s == step))
}

/// Whether the sequence mentions the given step at all.
#[allow(dead_code)]
pub fn mentions_step(events: &[Event], step: StepName) -> bool {
    events.iter().any(|e| {
        matches!(
            e,
            Event::StepStarted { step: s, .. }
                | Event::StepCompleted { step: s, .. }
                | Event::StepFailed { step: s, .. }
            if *s == step
        )
    })
}

/// Assert that the sequence is well-formed:
/// 1. WorkflowStarted comes first
/// 2. WorkflowCompleted comes last
/// 3. Every step completion/failure is preceded by its start
pub fn assert_event_sequence(events: &[Event]) {
    assert!(!events.is_empty(), "Event sequence is empty");

    assert!(
        matches!(events[0], Event::WorkflowStarted { .. }),
        "First event should be WorkflowStarted, got: {:?}",
        events[0]
    );

    let last = events.last().expect("non-empty");
    assert!(
        matches!(last, Event::WorkflowCompleted { .. }),
        "Last event should be WorkflowCompleted, got: {last:?}"
    );

    for (index, event) in events.iter().enumerate() {
        let step = match event {
            Event::StepCompleted { step, .. } | Event::StepFailed { step, .. } => *step,
            _ => continue,
        };
        let started_before = events[..index]
            .iter()
            .any(|e| matches!(e, Event::StepStarted { step: s, .. } if *s == step));
        assert!(started_before, "step {step} finished without starting");
    }
}

/// The final success flag from the WorkflowCompleted event.
pub fn completed_success(events: &[Event]) -> Option<bool> {
    events.iter().find_map(|e| match e {
        Event::WorkflowCompleted { success, .. } => Some(*success),
        _ => None,
    })
}
