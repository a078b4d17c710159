//! Workflow execution engine.
//!
//! The WorkflowEngine runs the fixed six-step pipeline for one
//! `WorkflowConfig` and produces one `WorkflowResult`, and exposes the
//! approval-callback entry point invoked when a human clicks an action link
//! from the notification email.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::Sender;
use tracing::warn;
use uuid::Uuid;

use crate::clients::base::{CaptionSource, ClientError};
use crate::clients::set::ClientSet;
use crate::config::models::{CaptionSourceKind, GlobalSettings, PromptTemplate};
use crate::state::register::PublishRegister;
use crate::state::run;
use rk_protocol::{
    CaptionBundle, CroppedImage, ErrorKind, Event, FinalOutput, GeneratedVideo, MotionPrompt,
    NotificationReceipt, PublishContainer, PublishHandle, PublishOutcome, StepError, StepName,
    StepOutcome, VideoDuration, WorkflowConfig, WorkflowResult,
};

/// The main workflow engine.
///
/// Steps 1-4 (image conversion, prompt, caption, video) are required: a
/// failure aborts the remaining required steps and fails the run. Steps 5-6
/// (notification, publish) are best-effort: their failures are recorded but
/// never flip the overall outcome.
pub struct WorkflowEngine {
    clients: ClientSet,
    register: Arc<PublishRegister>,
    settings: GlobalSettings,
    templates: Vec<PromptTemplate>,
}

impl WorkflowEngine {
    pub fn new(
        clients: ClientSet,
        register: Arc<PublishRegister>,
        settings: GlobalSettings,
        templates: Vec<PromptTemplate>,
    ) -> Self {
        Self {
            clients,
            register,
            settings,
            templates,
        }
    }

    /// The publish register backing steps 6 and the approval callback.
    pub fn register(&self) -> &Arc<PublishRegister> {
        &self.register
    }

    /// Status query entry point: one container by id.
    pub async fn container_status(&self, container_id: &str) -> Option<PublishContainer> {
        self.register.get_status(container_id).await
    }

    /// Status query entry point: all tracked containers.
    pub async fn list_containers(&self) -> Vec<PublishContainer> {
        self.register.list_all().await
    }

    /// Run the full pipeline for one configuration.
    ///
    /// Never returns an error: every failure is folded into the returned
    /// `WorkflowResult`, and wall-clock duration is recorded on all paths.
    pub async fn execute_complete_workflow(
        &self,
        config: &WorkflowConfig,
        events_tx: Sender<Event>,
    ) -> WorkflowResult {
        let started = Instant::now();
        let mut result = run::create_run();
        let id = result.workflow_id;

        run::start_run(&result, &events_tx, &config.image_url).await;

        // Step 1: crop the source image to the target aspect ratio.
        run::step_started(&events_tx, id, StepName::ImageConversion).await;
        let outcome = self.convert_image(config).await;
        let Some(image) = record_step(
            &mut result.steps.image_conversion,
            outcome,
            &events_tx,
            id,
            StepName::ImageConversion,
        )
        .await
        else {
            run::finish_run(&mut result, false, started, &events_tx).await;
            return result;
        };

        let duration = config
            .video_duration
            .unwrap_or(self.settings.default_duration);

        // Step 2: obtain a motion prompt (static template or generated).
        run::step_started(&events_tx, id, StepName::PromptGeneration).await;
        let outcome = self.resolve_motion_prompt(&image, duration).await;
        let Some(prompt) = record_step(
            &mut result.steps.prompt_generation,
            outcome,
            &events_tx,
            id,
            StepName::PromptGeneration,
        )
        .await
        else {
            run::finish_run(&mut result, false, started, &events_tx).await;
            return result;
        };

        // Step 3: caption + hashtags.
        run::step_started(&events_tx, id, StepName::CaptionGeneration).await;
        let source = match self.settings.caption_source {
            CaptionSourceKind::Image => CaptionSource::Image(&image),
            CaptionSourceKind::Prompt => CaptionSource::Prompt(&prompt.text),
        };
        let outcome = self
            .clients
            .captions
            .generate(source, &self.settings.caption)
            .await;
        let Some(caption) = record_step(
            &mut result.steps.caption_generation,
            outcome,
            &events_tx,
            id,
            StepName::CaptionGeneration,
        )
        .await
        else {
            run::finish_run(&mut result, false, started, &events_tx).await;
            return result;
        };

        // Step 4: generate the video.
        run::step_started(&events_tx, id, StepName::VideoGeneration).await;
        let outcome = self
            .clients
            .video
            .generate(&image, &prompt.text, duration)
            .await;
        let Some(video) = record_step(
            &mut result.steps.video_generation,
            outcome,
            &events_tx,
            id,
            StepName::VideoGeneration,
        )
        .await
        else {
            run::finish_run(&mut result, false, started, &events_tx).await;
            return result;
        };

        // Step 5 (best-effort): email the package for approval.
        let notification_sent = self
            .run_notification(config, &video, &caption, &mut result, &events_tx, id)
            .await;

        // Step 6 (best-effort): publish immediately, or record the skip.
        let container_id = self
            .run_publish(config, &video, &caption, &mut result, &events_tx, id)
            .await;

        let instagram_published = matches!(
            &result.steps.publish,
            Some(StepOutcome::Success(handle)) if !handle.skipped
        );

        result.final_output = Some(FinalOutput {
            image: image.reference,
            prompt: prompt.text,
            caption: caption.caption,
            hashtags: caption.hashtags,
            video_url: video.video_url,
            notification_sent,
            publish_container_id: container_id,
            instagram_published,
        });

        run::finish_run(&mut result, true, started, &events_tx).await;
        result
    }

    /// Approval-callback entry point.
    ///
    /// Joins caption and hashtags into one text blob and forwards to the
    /// publish register, surfacing its outcome unchanged. Invoked from a
    /// fire-and-forget callback context, so it must never raise.
    pub async fn handle_approval_callback(
        &self,
        video_url: &str,
        caption: &str,
        hashtags: &[String],
    ) -> PublishOutcome {
        let text = compose_publish_caption(caption, hashtags);
        self.register.create_container(video_url, &text).await
    }

    async fn convert_image(&self, config: &WorkflowConfig) -> Result<CroppedImage, ClientError> {
        if config.image_url.trim().is_empty() {
            return Err(ClientError::InvalidInput(
                "source image URL is empty".to_string(),
            ));
        }
        self.clients
            .media
            .crop_to_aspect_ratio(&config.image_url, self.settings.aspect_ratio)
            .await
    }

    /// Use the configured static template when it resolves; otherwise ask the
    /// vision model for a motion description.
    async fn resolve_motion_prompt(
        &self,
        image: &CroppedImage,
        duration: VideoDuration,
    ) -> Result<MotionPrompt, ClientError> {
        if let Some(name) = &self.settings.motion_template {
            if let Some(template) = self.find_template(name, duration) {
                return Ok(MotionPrompt {
                    text: template.body.clone(),
                    template: Some(template.name.clone()),
                });
            }
            warn!(template = %name, "configured motion template not found; falling back to generator");
        }

        let text = self.clients.prompts.describe_motion(image).await?;
        Ok(MotionPrompt {
            text,
            template: None,
        })
    }

    /// Prefer a template matching both name and duration; fall back to a
    /// name-only match.
    fn find_template(&self, name: &str, duration: VideoDuration) -> Option<&PromptTemplate> {
        self.templates
            .iter()
            .find(|t| t.name == name && t.duration.is_none_or(|d| d == duration))
            .or_else(|| self.templates.iter().find(|t| t.name == name))
    }

    /// Step 5. Returns whether the package email actually went out.
    async fn run_notification(
        &self,
        config: &WorkflowConfig,
        video: &GeneratedVideo,
        caption: &CaptionBundle,
        result: &mut WorkflowResult,
        events_tx: &Sender<Event>,
        id: Uuid,
    ) -> bool {
        run::step_started(events_tx, id, StepName::Notification).await;

        let recipient = config
            .recipient_email
            .clone()
            .or_else(|| self.settings.default_recipient.clone());

        let Some(recipient) = recipient else {
            // No recipient anywhere is configuration, not failure.
            result.steps.notification = Some(StepOutcome::Success(NotificationReceipt {
                recipient: None,
                sent: false,
            }));
            run::step_succeeded(events_tx, id, StepName::Notification).await;
            return false;
        };

        match self
            .clients
            .notifier
            .send_content_package(
                &recipient,
                &video.video_url,
                &caption.caption,
                &caption.hashtags,
            )
            .await
        {
            Ok(()) => {
                result.steps.notification = Some(StepOutcome::Success(NotificationReceipt {
                    recipient: Some(recipient),
                    sent: true,
                }));
                run::step_succeeded(events_tx, id, StepName::Notification).await;
                true
            }
            Err(client_error) => {
                let error: StepError = client_error.into();
                result.steps.notification = Some(StepOutcome::Failure(error.clone()));
                run::step_failed(events_tx, id, StepName::Notification, &error).await;
                false
            }
        }
    }

    /// Step 6. Returns the created container id, if any.
    async fn run_publish(
        &self,
        config: &WorkflowConfig,
        video: &GeneratedVideo,
        caption: &CaptionBundle,
        result: &mut WorkflowResult,
        events_tx: &Sender<Event>,
        id: Uuid,
    ) -> Option<String> {
        run::step_started(events_tx, id, StepName::Publish).await;

        if !config.auto_publish {
            result.steps.publish = Some(StepOutcome::Success(PublishHandle {
                skipped: true,
                container_id: None,
            }));
            run::step_succeeded(events_tx, id, StepName::Publish).await;
            return None;
        }

        let text = compose_publish_caption(&caption.caption, &caption.hashtags);
        let outcome = self.register.create_container(&video.video_url, &text).await;

        if outcome.success {
            result.steps.publish = Some(StepOutcome::Success(PublishHandle {
                skipped: false,
                container_id: outcome.container_id.clone(),
            }));
            run::step_succeeded(events_tx, id, StepName::Publish).await;
            if let Some(container_id) = &outcome.container_id {
                run::container_scheduled(events_tx, container_id).await;
            }
            outcome.container_id
        } else {
            let error = StepError::new(ErrorKind::Upstream, outcome.message);
            result.steps.publish = Some(StepOutcome::Failure(error.clone()));
            run::step_failed(events_tx, id, StepName::Publish, &error).await;
            None
        }
    }
}

/// Record a required step's outcome and emit the matching event.
///
/// Returns the payload on success; `None` tells the caller to abort the run.
async fn record_step<T: Clone>(
    slot: &mut Option<StepOutcome<T>>,
    outcome: Result<T, ClientError>,
    events_tx: &Sender<Event>,
    workflow_id: Uuid,
    step: StepName,
) -> Option<T> {
    match outcome {
        Ok(data) => {
            *slot = Some(StepOutcome::Success(data.clone()));
            run::step_succeeded(events_tx, workflow_id, step).await;
            Some(data)
        }
        Err(client_error) => {
            let error: StepError = client_error.into();
            *slot = Some(StepOutcome::Failure(error.clone()));
            run::step_failed(events_tx, workflow_id, step, &error).await;
            None
        }
    }
}

/// Caption and hashtags joined into the text blob the platform receives:
/// hashtags space-joined, appended after a blank line, only when non-empty.
pub fn compose_publish_caption(caption: &str, hashtags: &[String]) -> String {
    if hashtags.is_empty() {
        caption.to_string()
    } else {
        format!("{caption}\n\n{}", hashtags.join(" "))
    }
}
