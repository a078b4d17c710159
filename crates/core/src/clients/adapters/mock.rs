//! Mock client implementations for deterministic testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::clients::base::{
    AspectRatio, CaptionGenerator, CaptionSource, ClientError, MediaTransform, Notifier,
    PromptGenerator, PublishPlatform, VideoGenerator,
};
use rk_protocol::{CaptionBundle, CaptionOptions, CroppedImage, GeneratedVideo, VideoDuration};

#[derive(Clone)]
pub struct MockMediaTransform {
    result: Result<CroppedImage, ClientError>,
}

impl MockMediaTransform {
    pub fn success() -> Self {
        Self {
            result: Ok(CroppedImage {
                reference: "data:image/jpeg;base64,bW9jaw==".to_string(),
                width: 720,
                height: 1280,
            }),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ClientError::InvalidInput(
                "mock: source image unreachable".to_string(),
            )),
        }
    }
}

#[async_trait]
impl MediaTransform for MockMediaTransform {
    async fn crop_to_aspect_ratio(
        &self,
        _image_url: &str,
        _ratio: AspectRatio,
    ) -> Result<CroppedImage, ClientError> {
        self.result.clone()
    }
}

#[derive(Clone)]
pub struct MockPromptGenerator {
    result: Result<String, ClientError>,
}

impl MockPromptGenerator {
    pub fn success() -> Self {
        Self {
            result: Ok("Slow dolly-in with drifting golden light".to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ClientError::Upstream("mock: model unavailable".to_string())),
        }
    }
}

#[async_trait]
impl PromptGenerator for MockPromptGenerator {
    async fn describe_motion(&self, _image: &CroppedImage) -> Result<String, ClientError> {
        self.result.clone()
    }
}

#[derive(Clone)]
pub struct MockCaptionGenerator {
    result: Result<CaptionBundle, ClientError>,
}

impl MockCaptionGenerator {
    pub fn success() -> Self {
        Self {
            result: Ok(CaptionBundle {
                caption: "Chasing the last light of the day".to_string(),
                hashtags: vec!["#sunset".to_string(), "#reels".to_string()],
            }),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ClientError::Upstream(
                "mock: caption generation failed".to_string(),
            )),
        }
    }
}

#[async_trait]
impl CaptionGenerator for MockCaptionGenerator {
    async fn generate(
        &self,
        _source: CaptionSource<'_>,
        _options: &CaptionOptions,
    ) -> Result<CaptionBundle, ClientError> {
        self.result.clone()
    }
}

#[derive(Clone)]
pub struct MockVideoGenerator {
    result: Result<GeneratedVideo, ClientError>,
}

impl MockVideoGenerator {
    pub fn success() -> Self {
        Self {
            result: Ok(GeneratedVideo {
                video_url: "https://videos.example.com/mock.mp4".to_string(),
                task_id: Some("task-mock".to_string()),
            }),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(ClientError::Upstream("mock: render failed".to_string())),
        }
    }

    pub fn timing_out() -> Self {
        Self {
            result: Err(ClientError::Timeout(
                "mock: task did not finish within 300s".to_string(),
            )),
        }
    }
}

#[async_trait]
impl VideoGenerator for MockVideoGenerator {
    async fn generate(
        &self,
        _image: &CroppedImage,
        _prompt: &str,
        _duration: VideoDuration,
    ) -> Result<GeneratedVideo, ClientError> {
        self.result.clone()
    }
}

/// One recorded outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipient: String,
    pub video_url: Option<String>,
}

#[derive(Clone)]
pub struct MockNotifier {
    fail: bool,
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl MockNotifier {
    pub fn success() -> Self {
        Self {
            fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Everything delivered so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_approval(&self, recipient: &str) -> Result<(), ClientError> {
        if self.fail {
            return Err(ClientError::Transport("mock: smtp down".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentEmail {
                recipient: recipient.to_string(),
                video_url: None,
            });
        }
        Ok(())
    }

    async fn send_content_package(
        &self,
        recipient: &str,
        video_url: &str,
        _caption: &str,
        _hashtags: &[String],
    ) -> Result<(), ClientError> {
        if self.fail {
            return Err(ClientError::Transport("mock: smtp down".to_string()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentEmail {
                recipient: recipient.to_string(),
                video_url: Some(video_url.to_string()),
            });
        }
        Ok(())
    }
}

/// Mock publish platform with call counting, for register tests.
#[derive(Clone)]
pub struct MockPublishPlatform {
    available: bool,
    container_id: String,
    create_error: Option<ClientError>,
    confirm_error: Option<ClientError>,
    create_calls: Arc<AtomicUsize>,
    confirm_calls: Arc<AtomicUsize>,
}

impl MockPublishPlatform {
    pub fn success() -> Self {
        Self {
            available: true,
            container_id: "container-1".to_string(),
            create_error: None,
            confirm_error: None,
            create_calls: Arc::new(AtomicUsize::new(0)),
            confirm_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::success()
        }
    }

    pub fn create_failing(error: ClientError) -> Self {
        Self {
            create_error: Some(error),
            ..Self::success()
        }
    }

    pub fn confirm_failing() -> Self {
        Self {
            confirm_error: Some(ClientError::Upstream(
                "mock: publish rejected".to_string(),
            )),
            ..Self::success()
        }
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    pub fn create_call_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn confirm_call_count(&self) -> usize {
        self.confirm_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PublishPlatform for MockPublishPlatform {
    async fn check_availability(&self) -> bool {
        self.available
    }

    async fn create_container(
        &self,
        _media_url: &str,
        _caption: &str,
    ) -> Result<String, ClientError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        match &self.create_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.container_id.clone()),
        }
    }

    async fn confirm(&self, _container_id: &str) -> Result<String, ClientError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        match &self.confirm_error {
            Some(error) => Err(error.clone()),
            None => Ok(format!("media-{}", self.container_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_notifier_records_deliveries() {
        let notifier = MockNotifier::success();
        notifier
            .send_content_package("a@b.com", "https://v/1.mp4", "caption", &[])
            .await
            .expect("mock send should succeed");

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "a@b.com");
        assert_eq!(sent[0].video_url.as_deref(), Some("https://v/1.mp4"));
    }

    #[tokio::test]
    async fn test_mock_platform_counts_calls() {
        let platform = MockPublishPlatform::success().with_container_id("C9");

        let id = platform
            .create_container("https://v/1.mp4", "caption")
            .await
            .expect("create should succeed");
        assert_eq!(id, "C9");
        assert_eq!(platform.create_call_count(), 1);
        assert_eq!(platform.confirm_call_count(), 0);

        platform.confirm(&id).await.expect("confirm should succeed");
        assert_eq!(platform.confirm_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_platform_failure_modes() {
        assert!(!MockPublishPlatform::unavailable().check_availability().await);

        let failing =
            MockPublishPlatform::create_failing(ClientError::Transport("down".to_string()));
        let result = failing.create_container("u", "c").await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
