//! Extra mock client implementations for integration tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rk_core::clients::{AspectRatio, ClientError, MediaTransform, VideoGenerator};
use rk_protocol::{CroppedImage, GeneratedVideo, VideoDuration};

/// A media transform that counts invocations, for verifying that validation
/// failures never reach the network layer.
#[allow(dead_code)]
pub struct CountingMediaTransform {
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingMediaTransform {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_handle(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl MediaTransform for CountingMediaTransform {
    async fn crop_to_aspect_ratio(
        &self,
        _image_url: &str,
        _ratio: AspectRatio,
    ) -> Result<CroppedImage, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CroppedImage {
            reference: "data:image/jpeg;base64,Y291bnQ=".to_string(),
            width: 720,
            height: 1280,
        })
    }
}

/// A video generator that sleeps before responding, to exercise wall-clock
/// duration accounting.
#[allow(dead_code)]
pub struct DelayedVideoGenerator {
    pub delay_ms: u64,
}

#[async_trait]
impl VideoGenerator for DelayedVideoGenerator {
    async fn generate(
        &self,
        _image: &CroppedImage,
        _prompt: &str,
        _duration: VideoDuration,
    ) -> Result<GeneratedVideo, ClientError> {
        tokio::time::sleep(tokio::time::Duration::from_millis(self.delay_ms)).await;
        Ok(GeneratedVideo {
            video_url: "https://videos.example.com/delayed.mp4".to_string(),
            task_id: None,
        })
    }
}
