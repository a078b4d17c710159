//! E2E tests for workflow execution.
//!
//! These tests run the full pipeline against mock clients and verify:
//! - Sequential step execution and event emission
//! - Required vs best-effort failure semantics
//! - Auto-publish and approval-callback paths through the register
//! - The wire shape of serialized results

mod common;

use common::assertions::*;
use common::fixtures::*;
use common::mock_clients::{CountingMediaTransform, DelayedVideoGenerator};

use rk_core::clients::adapters::{MockNotifier, MockPublishPlatform, MockVideoGenerator};
use rk_core::clients::ClientSet;
use rk_protocol::{Event, PublishStatus, StepName, VideoDuration, WorkflowConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Drain all buffered events after a completed run.
fn drain_events(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_full_workflow_event_sequence() {
    let engine = create_success_engine();
    let (tx, mut rx) = mpsc::channel(256);

    let result = engine
        .execute_complete_workflow(&create_test_config(), tx)
        .await;
    let events = drain_events(&mut rx);

    assert!(result.success);
    assert!(has_workflow_started(&events));
    assert_event_sequence(&events);

    for step in [
        StepName::ImageConversion,
        StepName::PromptGeneration,
        StepName::CaptionGeneration,
        StepName::VideoGeneration,
        StepName::Notification,
        StepName::Publish,
    ] {
        assert!(
            has_step_completed(&events, step),
            "expected a completed event for {step}"
        );
    }

    assert_eq!(completed_success(&events), Some(true));
}

/// Concrete scenario: all collaborators succeed, auto-publish off.
#[tokio::test]
async fn test_scenario_success_with_skipped_publish() {
    let engine = create_success_engine();
    let (tx, _rx) = mpsc::channel(256);

    let config = WorkflowConfig {
        image_url: "https://x/img.jpg".to_string(),
        recipient_email: Some("a@b.com".to_string()),
        video_duration: Some(VideoDuration::Short),
        auto_publish: false,
    };

    let result = engine.execute_complete_workflow(&config, tx).await;

    assert!(result.success);
    let output = result.final_output.as_ref().expect("final output present");
    assert!(!output.instagram_published);

    // Check the wire shape, not just the in-memory types.
    let json = serde_json::to_value(&result).expect("serializable");
    assert_eq!(json["success"], serde_json::json!(true));
    assert_eq!(
        json["steps"]["publish"]["data"]["skipped"],
        serde_json::json!(true)
    );
    assert_eq!(
        json["finalOutput"]["instagramPublished"],
        serde_json::json!(false)
    );
}

/// Concrete scenario: the video generator raises.
#[tokio::test]
async fn test_scenario_video_failure() {
    let mut clients = ClientSet::mocks();
    clients.video = Arc::new(MockVideoGenerator::failing());
    let engine = create_engine(clients, Arc::new(MockPublishPlatform::success()));
    let (tx, mut rx) = mpsc::channel(256);

    let result = engine
        .execute_complete_workflow(&create_test_config(), tx)
        .await;
    let events = drain_events(&mut rx);

    assert!(!result.success);
    assert!(result.final_output.is_none());

    let video = result.steps.video_generation.as_ref().expect("recorded");
    assert!(!video.is_success());

    // The notification step was never touched.
    assert!(result.steps.notification.is_none());
    assert!(!mentions_step(&events, StepName::Notification));

    assert!(has_step_failed(&events, StepName::VideoGeneration));
    assert_eq!(completed_success(&events), Some(false));

    let json = serde_json::to_value(&result).expect("serializable");
    assert_eq!(
        json["steps"]["videoGeneration"]["success"],
        serde_json::json!(false)
    );
    assert!(json["steps"].get("notification").is_none());
    assert!(json.get("finalOutput").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_auto_publish_end_to_end() {
    let platform = Arc::new(MockPublishPlatform::success().with_container_id("C42"));
    let engine = create_engine(ClientSet::mocks(), platform.clone());
    let (tx, mut rx) = mpsc::channel(256);

    let mut config = create_test_config();
    config.auto_publish = true;

    let result = engine.execute_complete_workflow(&config, tx).await;
    let events = drain_events(&mut rx);

    assert!(result.success);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::ContainerScheduled { container_id } if container_id == "C42")));

    // Immediately after the run the container is still processing.
    let container = engine.container_status("C42").await.expect("tracked");
    assert_eq!(container.status, PublishStatus::Processing);

    // After the confirm delay elapses it reaches exactly one terminal state.
    tokio::time::sleep(Duration::from_secs(61)).await;
    let container = engine.container_status("C42").await.expect("tracked");
    assert_eq!(container.status, PublishStatus::Published);
    assert_eq!(platform.confirm_call_count(), 1);
}

#[tokio::test]
async fn test_validation_failure_reaches_no_client() {
    let media = CountingMediaTransform::new();
    let calls = media.calls_handle();

    let mut clients = ClientSet::mocks();
    clients.media = Arc::new(media);
    let engine = create_engine(clients, Arc::new(MockPublishPlatform::success()));
    let (tx, _rx) = mpsc::channel(256);

    let mut config = create_test_config();
    config.image_url = String::new();

    let result = engine.execute_complete_workflow(&config, tx).await;

    assert!(!result.success);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_notification_failure_keeps_run_successful() {
    let mut clients = ClientSet::mocks();
    clients.notifier = Arc::new(MockNotifier::failing());
    let engine = create_engine(clients, Arc::new(MockPublishPlatform::success()));
    let (tx, mut rx) = mpsc::channel(256);

    let result = engine
        .execute_complete_workflow(&create_test_config(), tx)
        .await;
    let events = drain_events(&mut rx);

    assert!(result.success);
    assert!(has_step_failed(&events, StepName::Notification));
    assert!(has_step_completed(&events, StepName::Publish));
    assert_eq!(completed_success(&events), Some(true));
}

#[tokio::test]
async fn test_duration_covers_slow_steps() {
    let mut clients = ClientSet::mocks();
    clients.video = Arc::new(DelayedVideoGenerator { delay_ms: 50 });
    let engine = create_engine(clients, Arc::new(MockPublishPlatform::success()));
    let (tx, _rx) = mpsc::channel(256);

    let result = engine
        .execute_complete_workflow(&create_test_config(), tx)
        .await;

    assert!(result.success);
    assert!(
        result.duration_ms >= 50,
        "duration {}ms should include the 50ms video step",
        result.duration_ms
    );
}

/// Concrete scenario: approval callback followed by a status poll.
#[tokio::test(start_paused = true)]
async fn test_approval_callback_then_status_poll() {
    let platform = Arc::new(MockPublishPlatform::success().with_container_id("C1"));
    let engine = create_engine(ClientSet::mocks(), platform);

    let outcome = engine
        .handle_approval_callback(
            "https://v/1.mp4",
            "Hello",
            &["#a".to_string(), "#b".to_string()],
        )
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.container_id.as_deref(), Some("C1"));
    assert!(!outcome.message.is_empty());

    let container = engine.container_status("C1").await.expect("tracked");
    assert_eq!(container.status, PublishStatus::Processing);
    assert_eq!(container.caption, "Hello\n\n#a #b");

    tokio::time::sleep(Duration::from_secs(61)).await;
    let container = engine.container_status("C1").await.expect("tracked");
    assert!(container.status.is_terminal());
}

#[tokio::test]
async fn test_status_query_for_unknown_container() {
    let engine = create_success_engine();
    assert!(engine.container_status("does-not-exist").await.is_none());
    assert!(engine.list_containers().await.is_empty());
}
