//! Workflow configuration, per-step outcomes, and run results.
//!
//! This module defines the input to one orchestration run, the unified
//! step-outcome sum type recorded for every pipeline stage, and the
//! aggregate result returned to the caller.

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

/// Requested clip length, expressed as the provider's second-counts.
///
/// Serialized as `"5"` / `"10"` to match the generation API's duration
/// parameter.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoDuration {
    /// A five-second clip.
    #[default]
    #[serde(rename = "5")]
    Short,

    /// A ten-second clip.
    #[serde(rename = "10")]
    Long,
}

impl VideoDuration {
    /// Clip length in seconds as sent to the video provider.
    pub fn seconds(self) -> u32 {
        match self {
            VideoDuration::Short => 5,
            VideoDuration::Long => 10,
        }
    }
}

impl std::str::FromStr for VideoDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" | "5" => Ok(VideoDuration::Short),
            "long" | "10" => Ok(VideoDuration::Long),
            other => Err(format!("unknown duration '{other}' (expected short or long)")),
        }
    }
}

/// Input to one orchestration run. Immutable for the duration of the run.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Source image to build the video from.
    pub image_url: String,

    /// Where to send the approval email. `None` falls back to the configured
    /// default recipient, or skips notification entirely if none is set.
    #[serde(default)]
    pub recipient_email: Option<String>,

    /// Requested clip length. `None` uses the configured default.
    #[serde(default)]
    pub video_duration: Option<VideoDuration>,

    /// Create a publish container immediately instead of waiting for the
    /// email approval round-trip.
    #[serde(default, rename = "autoPublishToInstagram")]
    pub auto_publish: bool,
}

impl WorkflowConfig {
    /// Create a config for the given source image with all options defaulted.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            recipient_email: None,
            video_duration: None,
            auto_publish: false,
        }
    }
}

/// Unified error taxonomy shared by every pipeline stage.
///
/// Timeouts are reported as [`ErrorKind::Transport`] with a distinguishing
/// message rather than a separate kind.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Missing or malformed required input, detected before any external call.
    Validation,

    /// The external API returned a non-success response.
    Upstream,

    /// Network-level failure or exceeded wait budget.
    Transport,

    /// A logic or lifetime bug inside the core itself.
    Internal,
}

/// The error half of a step outcome.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StepError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StepError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// The one generic per-step sum type.
///
/// Replaces the original's ad hoc `{success, data?, error?}` objects
/// duplicated per step name. Serialized as a tagged object so external
/// consumers still see the original wire shape:
///
/// ```json
/// {"success": true, "data": {...}}
/// {"success": false, "error": {"kind": "upstream", "message": "..."}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome<T> {
    Success(T),
    Failure(StepError),
}

impl<T> StepOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Success(_))
    }

    /// The payload, if this outcome is a success.
    pub fn data(&self) -> Option<&T> {
        match self {
            StepOutcome::Success(data) => Some(data),
            StepOutcome::Failure(_) => None,
        }
    }

    /// The error, if this outcome is a failure.
    pub fn error(&self) -> Option<&StepError> {
        match self {
            StepOutcome::Success(_) => None,
            StepOutcome::Failure(error) => Some(error),
        }
    }
}

impl<T> From<Result<T, StepError>> for StepOutcome<T> {
    fn from(result: Result<T, StepError>) -> Self {
        match result {
            Ok(data) => StepOutcome::Success(data),
            Err(error) => StepOutcome::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for StepOutcome<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            StepOutcome::Success(data) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
            }
            StepOutcome::Failure(error) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for StepOutcome<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(bound(deserialize = "T: Deserialize<'de>"))]
        struct Repr<T> {
            success: bool,
            #[serde(default)]
            data: Option<T>,
            #[serde(default)]
            error: Option<StepError>,
        }

        let repr = Repr::<T>::deserialize(deserializer)?;
        match (repr.success, repr.data, repr.error) {
            (true, Some(data), _) => Ok(StepOutcome::Success(data)),
            (false, _, Some(error)) => Ok(StepOutcome::Failure(error)),
            (true, None, _) => Err(de::Error::missing_field("data")),
            (false, _, None) => Err(de::Error::missing_field("error")),
        }
    }
}

/// Identifies one of the six pipeline stages.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepName {
    ImageConversion,
    PromptGeneration,
    CaptionGeneration,
    VideoGeneration,
    Notification,
    Publish,
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StepName::ImageConversion => "image-conversion",
            StepName::PromptGeneration => "prompt-generation",
            StepName::CaptionGeneration => "caption-generation",
            StepName::VideoGeneration => "video-generation",
            StepName::Notification => "notification",
            StepName::Publish => "publish",
        };
        write!(f, "{name}")
    }
}

/// The cropped source image as handed to downstream stages.
///
/// `reference` is either an HTTPS URL or a `data:` URI, whichever the
/// transform produced.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CroppedImage {
    pub reference: String,
    pub width: u32,
    pub height: u32,
}

/// The cinematic motion description driving video generation.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MotionPrompt {
    pub text: String,

    /// Name of the static template the text came from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Caption text plus hashtags, as returned by the caption generator.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionBundle {
    pub caption: String,
    pub hashtags: Vec<String>,
}

/// A finished clip from the video provider.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVideo {
    pub video_url: String,

    /// Provider-side task id, when the provider exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

/// Outcome payload of the notification stage.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReceipt {
    /// Where the content package went. `None` means no recipient was
    /// configured and the stage was a no-op.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    pub sent: bool,
}

/// Outcome payload of the publish stage.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishHandle {
    /// True when auto-publish was off and the stage recorded a deliberate
    /// no-op rather than creating a container.
    pub skipped: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

/// Named, ordered set of step outcomes for one run.
///
/// `None` means the step was never reached: a failed required step leaves
/// every later field untouched.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSteps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_conversion: Option<StepOutcome<CroppedImage>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_generation: Option<StepOutcome<MotionPrompt>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_generation: Option<StepOutcome<CaptionBundle>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_generation: Option<StepOutcome<GeneratedVideo>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<StepOutcome<NotificationReceipt>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<StepOutcome<PublishHandle>>,
}

impl WorkflowSteps {
    /// True when every required step (all but notification and publish) is a
    /// recorded success.
    pub fn all_required_succeeded(&self) -> bool {
        fn ok<T>(outcome: &Option<StepOutcome<T>>) -> bool {
            outcome.as_ref().is_some_and(StepOutcome::is_success)
        }

        ok(&self.image_conversion)
            && ok(&self.prompt_generation)
            && ok(&self.caption_generation)
            && ok(&self.video_generation)
    }
}

/// Snapshot of the finished package, present only when the run succeeded.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinalOutput {
    pub image: String,
    pub prompt: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    pub video_url: String,
    pub notification_sent: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_container_id: Option<String>,

    pub instagram_published: bool,
}

/// Output of one orchestration run.
///
/// Invariants:
/// - `success == true` implies every required step outcome is a success.
/// - `final_output` is present iff `success` is true.
/// - `duration_ms` is recorded on every path, including failures.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub workflow_id: Uuid,
    pub steps: WorkflowSteps,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_output: Option<FinalOutput>,

    pub success: bool,
    pub duration_ms: u64,
}
