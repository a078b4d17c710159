//! Dependency-injected client bundle.
//!
//! All leaf clients are constructed explicitly at startup and handed to the
//! engine as one bundle; there are no lazily-built process-wide singletons.

use std::sync::Arc;

use crate::clients::adapters::{
    HttpMediaTransform, MockCaptionGenerator, MockMediaTransform, MockNotifier,
    MockPromptGenerator, MockVideoGenerator, OpenAiClient, ResendNotifier, RunwayClient,
};
use crate::clients::base::{CaptionGenerator, MediaTransform, Notifier, PromptGenerator, VideoGenerator};
use crate::config::models::AppConfig;

/// One `Arc<dyn …>` per capability the engine consumes.
#[derive(Clone)]
pub struct ClientSet {
    pub media: Arc<dyn MediaTransform>,
    pub prompts: Arc<dyn PromptGenerator>,
    pub captions: Arc<dyn CaptionGenerator>,
    pub video: Arc<dyn VideoGenerator>,
    pub notifier: Arc<dyn Notifier>,
}

impl ClientSet {
    /// Build the production adapters from configuration, sharing one HTTP
    /// client across all of them.
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        let openai = Arc::new(OpenAiClient::from_config(&config.openai, http.clone()));

        Self {
            media: Arc::new(HttpMediaTransform::new(http.clone())),
            prompts: openai.clone(),
            captions: openai,
            video: Arc::new(RunwayClient::from_config(&config.runway, http.clone())),
            notifier: Arc::new(ResendNotifier::from_config(&config.resend, http)),
        }
    }

    /// All-success mocks, for tests and dry runs.
    pub fn mocks() -> Self {
        Self {
            media: Arc::new(MockMediaTransform::success()),
            prompts: Arc::new(MockPromptGenerator::success()),
            captions: Arc::new(MockCaptionGenerator::success()),
            video: Arc::new(MockVideoGenerator::success()),
            notifier: Arc::new(MockNotifier::success()),
        }
    }
}
