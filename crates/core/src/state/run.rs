//! Workflow run-state transitions.
//!
//! This module provides functions for managing the lifecycle of one
//! `WorkflowResult`, including event emission. The engine composes these
//! rather than mutating the result ad hoc.

use rk_protocol::{Event, StepError, StepName, WorkflowResult, WorkflowSteps};
use std::time::Instant;
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

/// Create a new, empty run record.
///
/// The result starts unsuccessful with no recorded steps; the engine fills
/// it in step by step.
pub fn create_run() -> WorkflowResult {
    WorkflowResult {
        workflow_id: Uuid::new_v4(),
        steps: WorkflowSteps::default(),
        final_output: None,
        success: false,
        duration_ms: 0,
    }
}

/// Announce the run and emit the started event.
pub async fn start_run(result: &WorkflowResult, events_tx: &Sender<Event>, image_url: &str) {
    let _ = events_tx
        .send(Event::WorkflowStarted {
            workflow_id: result.workflow_id,
            image_url: image_url.to_string(),
        })
        .await;
}

/// Emit the step-started event.
pub async fn step_started(events_tx: &Sender<Event>, workflow_id: Uuid, step: StepName) {
    let _ = events_tx
        .send(Event::StepStarted { workflow_id, step })
        .await;
}

/// Emit the step-completed event.
pub async fn step_succeeded(events_tx: &Sender<Event>, workflow_id: Uuid, step: StepName) {
    let _ = events_tx
        .send(Event::StepCompleted { workflow_id, step })
        .await;
}

/// Emit the step-failed event.
pub async fn step_failed(
    events_tx: &Sender<Event>,
    workflow_id: Uuid,
    step: StepName,
    error: &StepError,
) {
    let _ = events_tx
        .send(Event::StepFailed {
            workflow_id,
            step,
            error: error.clone(),
        })
        .await;
}

/// Emit the container-scheduled event.
pub async fn container_scheduled(events_tx: &Sender<Event>, container_id: &str) {
    let _ = events_tx
        .send(Event::ContainerScheduled {
            container_id: container_id.to_string(),
        })
        .await;
}

/// Finalize the run: set the success flag, record wall-clock duration, and
/// emit the completed event. Called on every path, including failures.
pub async fn finish_run(
    result: &mut WorkflowResult,
    success: bool,
    started: Instant,
    events_tx: &Sender<Event>,
) {
    result.success = success;
    result.duration_ms = started.elapsed().as_millis() as u64;
    let _ = events_tx
        .send(Event::WorkflowCompleted {
            workflow_id: result.workflow_id,
            success,
            duration_ms: result.duration_ms,
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rk_protocol::ErrorKind;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_create_run() {
        let result = create_run();
        assert!(!result.success);
        assert!(result.final_output.is_none());
        assert!(result.steps.image_conversion.is_none());
        assert_eq!(result.duration_ms, 0);
    }

    #[tokio::test]
    async fn test_start_run_emits_event() {
        let result = create_run();
        let (tx, mut rx) = mpsc::channel(10);

        start_run(&result, &tx, "https://x/img.jpg").await;

        let event = rx.recv().await.expect("should receive event");
        assert!(matches!(
            event,
            Event::WorkflowStarted { workflow_id, image_url }
                if workflow_id == result.workflow_id && image_url == "https://x/img.jpg"
        ));
    }

    #[tokio::test]
    async fn test_step_events() {
        let (tx, mut rx) = mpsc::channel(10);
        let id = Uuid::new_v4();

        step_started(&tx, id, StepName::VideoGeneration).await;
        step_succeeded(&tx, id, StepName::VideoGeneration).await;
        step_failed(
            &tx,
            id,
            StepName::Notification,
            &StepError::new(ErrorKind::Transport, "smtp down"),
        )
        .await;

        assert!(matches!(
            rx.recv().await.expect("event"),
            Event::StepStarted { step: StepName::VideoGeneration, .. }
        ));
        assert!(matches!(
            rx.recv().await.expect("event"),
            Event::StepCompleted { step: StepName::VideoGeneration, .. }
        ));
        assert!(matches!(
            rx.recv().await.expect("event"),
            Event::StepFailed { step: StepName::Notification, error, .. }
                if error.message == "smtp down"
        ));
    }

    #[tokio::test]
    async fn test_finish_run_records_duration_and_success() {
        let mut result = create_run();
        let (tx, mut rx) = mpsc::channel(10);
        let started = Instant::now();

        finish_run(&mut result, true, started, &tx).await;

        assert!(result.success);
        let event = rx.recv().await.expect("should receive event");
        assert!(matches!(event, Event::WorkflowCompleted { success: true, .. }));
    }

    #[tokio::test]
    async fn test_finish_run_works_without_receiver() {
        // Dropping the receiver must not affect run semantics.
        let mut result = create_run();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        finish_run(&mut result, false, Instant::now(), &tx).await;
        assert!(!result.success);
    }
}
