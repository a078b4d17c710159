//! Client capability traits and supporting types.
//!
//! Every external collaborator the workflow touches is abstracted behind one
//! of these traits (Adapter Pattern). The engine only ever sees the trait;
//! provider specifics live in [`crate::clients::adapters`].

use async_trait::async_trait;
use rk_protocol::{
    CaptionBundle, CaptionOptions, CroppedImage, ErrorKind, GeneratedVideo, StepError,
    VideoDuration,
};
use thiserror::Error;

/// Errors shared by every leaf client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Required input was missing or malformed; nothing was sent upstream.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Credentials for the provider are not configured.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The provider returned a non-success response.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Network-level failure before a response was obtained.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The wait budget for an asynchronous provider task ran out.
    #[error("Timed out: {0}")]
    Timeout(String),
}

impl From<ClientError> for StepError {
    fn from(error: ClientError) -> Self {
        let kind = match &error {
            ClientError::InvalidInput(_) | ClientError::MissingCredentials(_) => {
                ErrorKind::Validation
            }
            ClientError::Upstream(_) => ErrorKind::Upstream,
            // Timeouts propagate as transport failures, distinguished only by
            // the message text.
            ClientError::Transport(_) | ClientError::Timeout(_) => ErrorKind::Transport,
        };
        StepError::new(kind, error.to_string())
    }
}

/// Target aspect ratio for the image transform, e.g. 9:16 for Reels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const REELS: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Width divided by height.
    pub fn as_f64(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

impl std::str::FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| format!("aspect ratio '{s}' is not of the form W:H"))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("aspect ratio width '{w}' is not a number"))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("aspect ratio height '{h}' is not a number"))?;
        if width == 0 || height == 0 {
            return Err(format!("aspect ratio '{s}' has a zero component"));
        }
        Ok(AspectRatio { width, height })
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// What the caption generator should look at.
#[derive(Debug, Clone, Copy)]
pub enum CaptionSource<'a> {
    /// Describe the (cropped) source image directly.
    Image(&'a CroppedImage),

    /// Write against the motion prompt text instead.
    Prompt(&'a str),
}

/// Crops or resizes a source image to a target aspect ratio.
#[async_trait]
pub trait MediaTransform: Send + Sync {
    /// Fetch `image_url`, center-crop it to `ratio`, and return a reference
    /// downstream stages can pass to the video provider.
    ///
    /// Fails with [`ClientError::InvalidInput`] when the source is
    /// unreachable or not a decodable image.
    async fn crop_to_aspect_ratio(
        &self,
        image_url: &str,
        ratio: AspectRatio,
    ) -> Result<CroppedImage, ClientError>;
}

/// Produces a cinematic motion description for a still image.
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    async fn describe_motion(&self, image: &CroppedImage) -> Result<String, ClientError>;
}

/// Produces caption text and hashtags.
#[async_trait]
pub trait CaptionGenerator: Send + Sync {
    async fn generate(
        &self,
        source: CaptionSource<'_>,
        options: &CaptionOptions,
    ) -> Result<CaptionBundle, ClientError>;
}

/// Turns an image plus motion prompt into a short video.
///
/// Implementations may poll a provider-side task internally; the engine only
/// sees one awaitable call that resolves to a playable URL.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    async fn generate(
        &self,
        image: &CroppedImage,
        prompt: &str,
        duration: VideoDuration,
    ) -> Result<GeneratedVideo, ClientError>;
}

/// Sends transactional email with embedded action links.
///
/// Implementations retry internally (3 attempts, linear backoff) and raise
/// only after exhausting retries.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Acknowledge that an approval action was received.
    async fn send_approval(&self, recipient: &str) -> Result<(), ClientError>;

    /// Deliver the full content package with approve/reject action links.
    async fn send_content_package(
        &self,
        recipient: &str,
        video_url: &str,
        caption: &str,
        hashtags: &[String],
    ) -> Result<(), ClientError>;
}

/// Two-phase publish protocol against the social platform.
///
/// Both calls are single external requests with no internal retry.
#[async_trait]
pub trait PublishPlatform: Send + Sync {
    /// Whether platform credentials are configured. Checked by the register
    /// before any network call is attempted.
    async fn check_availability(&self) -> bool;

    /// Create a publish container for the video; returns the platform id.
    async fn create_container(
        &self,
        media_url: &str,
        caption: &str,
    ) -> Result<String, ClientError>;

    /// Finalize a previously created container; returns the published media id.
    async fn confirm(&self, container_id: &str) -> Result<String, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_to_step_error_kinds() {
        let cases = [
            (
                ClientError::InvalidInput("empty url".to_string()),
                ErrorKind::Validation,
            ),
            (
                ClientError::MissingCredentials("openai".to_string()),
                ErrorKind::Validation,
            ),
            (
                ClientError::Upstream("bad gateway".to_string()),
                ErrorKind::Upstream,
            ),
            (
                ClientError::Transport("connection reset".to_string()),
                ErrorKind::Transport,
            ),
            (
                ClientError::Timeout("task exceeded 300s".to_string()),
                ErrorKind::Transport,
            ),
        ];

        for (error, expected_kind) in cases {
            let step_error: StepError = error.into();
            assert_eq!(step_error.kind, expected_kind);
            assert!(!step_error.message.is_empty());
        }
    }

    #[test]
    fn test_timeout_message_is_distinguishable() {
        let step_error: StepError = ClientError::Timeout("waited 300s".to_string()).into();
        assert_eq!(step_error.kind, ErrorKind::Transport);
        assert!(step_error.message.contains("Timed out"));
    }

    #[test]
    fn test_aspect_ratio_parsing() {
        let ratio: AspectRatio = "9:16".parse().expect("should parse");
        assert_eq!(ratio, AspectRatio::REELS);
        assert_eq!(ratio.to_string(), "9:16");

        let ratio: AspectRatio = " 4 : 5 ".parse().expect("should parse with spaces");
        assert_eq!(ratio.width, 4);
        assert_eq!(ratio.height, 5);

        assert!("916".parse::<AspectRatio>().is_err());
        assert!("9:0".parse::<AspectRatio>().is_err());
        assert!("a:b".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_aspect_ratio_as_f64() {
        let ratio = AspectRatio::REELS;
        assert!((ratio.as_f64() - 0.5625).abs() < f64::EPSILON);
    }
}
