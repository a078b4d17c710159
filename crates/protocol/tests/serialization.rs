use rk_protocol::*;
use uuid::Uuid;

#[test]
fn test_workflow_config_deserialization() {
    let json = r#"{
        "imageUrl": "https://x/img.jpg",
        "recipientEmail": "a@b.com",
        "videoDuration": "5",
        "autoPublishToInstagram": false
    }"#;

    let config: WorkflowConfig = serde_json::from_str(json).expect("Failed to deserialize config");

    assert_eq!(config.image_url, "https://x/img.jpg");
    assert_eq!(config.recipient_email.as_deref(), Some("a@b.com"));
    assert_eq!(config.video_duration, Some(VideoDuration::Short));
    assert!(!config.auto_publish);
}

#[test]
fn test_workflow_config_optional_fields_default() {
    let json = r#"{"imageUrl": "https://x/img.jpg"}"#;
    let config: WorkflowConfig = serde_json::from_str(json).expect("Failed to deserialize config");

    assert!(config.recipient_email.is_none());
    assert!(config.video_duration.is_none());
    assert!(!config.auto_publish);
}

#[test]
fn test_video_duration_wire_format() {
    assert_eq!(
        serde_json::to_value(VideoDuration::Short).expect("serialize"),
        serde_json::json!("5")
    );
    assert_eq!(
        serde_json::to_value(VideoDuration::Long).expect("serialize"),
        serde_json::json!("10")
    );
    assert_eq!(VideoDuration::Long.seconds(), 10);
}

#[test]
fn test_step_outcome_success_shape() {
    let outcome = StepOutcome::Success(GeneratedVideo {
        video_url: "https://v/1.mp4".to_string(),
        task_id: Some("t-1".to_string()),
    });

    let json = serde_json::to_value(&outcome).expect("Failed to serialize outcome");
    assert_eq!(json["success"], serde_json::json!(true));
    assert_eq!(json["data"]["videoUrl"], serde_json::json!("https://v/1.mp4"));
    assert!(json.get("error").is_none());

    let back: StepOutcome<GeneratedVideo> =
        serde_json::from_value(json).expect("Failed to deserialize outcome");
    assert_eq!(back, outcome);
}

#[test]
fn test_step_outcome_failure_shape() {
    let outcome: StepOutcome<GeneratedVideo> =
        StepOutcome::Failure(StepError::new(ErrorKind::Upstream, "provider said no"));

    let json = serde_json::to_value(&outcome).expect("Failed to serialize outcome");
    assert_eq!(json["success"], serde_json::json!(false));
    assert_eq!(json["error"]["kind"], serde_json::json!("upstream"));
    assert!(json.get("data").is_none());

    let back: StepOutcome<GeneratedVideo> =
        serde_json::from_value(json).expect("Failed to deserialize outcome");
    assert_eq!(back, outcome);
}

#[test]
fn test_step_outcome_rejects_inconsistent_shape() {
    // success=true without a payload is malformed
    let json = serde_json::json!({"success": true});
    let result: Result<StepOutcome<CroppedImage>, _> = serde_json::from_value(json);
    assert!(result.is_err());
}

#[test]
fn test_workflow_result_round_trip() {
    let result = WorkflowResult {
        workflow_id: Uuid::new_v4(),
        steps: WorkflowSteps {
            image_conversion: Some(StepOutcome::Success(CroppedImage {
                reference: "data:image/jpeg;base64,AAAA".to_string(),
                width: 720,
                height: 1280,
            })),
            prompt_generation: Some(StepOutcome::Failure(StepError::new(
                ErrorKind::Transport,
                "connection reset",
            ))),
            ..Default::default()
        },
        final_output: None,
        success: false,
        duration_ms: 1234,
    };

    let json = serde_json::to_string(&result).expect("Failed to serialize result");
    let back: WorkflowResult = serde_json::from_str(&json).expect("Failed to deserialize result");

    assert_eq!(back, result);
    // unreached steps are omitted entirely, not serialized as null
    assert!(!json.contains("captionGeneration"));
}

#[test]
fn test_all_required_succeeded() {
    let mut steps = WorkflowSteps {
        image_conversion: Some(StepOutcome::Success(CroppedImage {
            reference: "r".to_string(),
            width: 1,
            height: 1,
        })),
        prompt_generation: Some(StepOutcome::Success(MotionPrompt {
            text: "p".to_string(),
            template: None,
        })),
        caption_generation: Some(StepOutcome::Success(CaptionBundle {
            caption: "c".to_string(),
            hashtags: vec![],
        })),
        video_generation: Some(StepOutcome::Success(GeneratedVideo {
            video_url: "v".to_string(),
            task_id: None,
        })),
        ..Default::default()
    };
    assert!(steps.all_required_succeeded());

    // a best-effort failure does not affect the required check
    steps.notification = Some(StepOutcome::Failure(StepError::new(
        ErrorKind::Transport,
        "smtp down",
    )));
    assert!(steps.all_required_succeeded());

    steps.video_generation = Some(StepOutcome::Failure(StepError::new(
        ErrorKind::Upstream,
        "render failed",
    )));
    assert!(!steps.all_required_succeeded());
}

#[test]
fn test_publish_status_serialization() {
    let status = PublishStatus::Processing;
    let json = serde_json::to_value(status).expect("Failed to serialize PublishStatus");
    assert_eq!(json, "PROCESSING");

    let back: PublishStatus = serde_json::from_value(json).expect("Failed to deserialize");
    assert_eq!(back, PublishStatus::Processing);

    assert!(PublishStatus::Published.is_terminal());
    assert!(PublishStatus::Failed.is_terminal());
    assert!(!PublishStatus::Processing.is_terminal());
}

#[test]
fn test_publish_outcome_shapes() {
    let ok = PublishOutcome::success("C1", "container created");
    assert!(ok.success);
    assert_eq!(ok.container_id.as_deref(), Some("C1"));

    let err = PublishOutcome::failure("credentials missing");
    assert!(!err.success);
    assert!(err.container_id.is_none());

    let json = serde_json::to_value(&err).expect("serialize");
    assert!(json.get("containerId").is_none());
}

#[test]
fn test_event_tagged_serialization() {
    let event = Event::StepCompleted {
        workflow_id: Uuid::new_v4(),
        step: StepName::VideoGeneration,
    };

    let json = serde_json::to_value(&event).expect("Failed to serialize Event");
    assert_eq!(json["type"], serde_json::json!("stepCompleted"));
    assert_eq!(json["payload"]["step"], serde_json::json!("videoGeneration"));
}

#[test]
fn test_caption_options_defaults() {
    let options: CaptionOptions = serde_json::from_str("{}").expect("Failed to deserialize");
    assert_eq!(options.tone, Tone::Casual);
    assert_eq!(options.max_hashtags, 10);
    assert!(options.include_call_to_action);
}
