//! Test fixtures for building engines and sample configurations.

use std::sync::Arc;
use std::time::Duration;

use rk_core::clients::adapters::MockPublishPlatform;
use rk_core::clients::ClientSet;
use rk_core::config::models::GlobalSettings;
use rk_core::engine::WorkflowEngine;
use rk_core::state::PublishRegister;
use rk_protocol::{VideoDuration, WorkflowConfig};

/// The concrete scenario config from the daily run.
pub fn create_test_config() -> WorkflowConfig {
    WorkflowConfig {
        image_url: "https://x/img.jpg".to_string(),
        recipient_email: Some("a@b.com".to_string()),
        video_duration: Some(VideoDuration::Short),
        auto_publish: false,
    }
}

/// Engine over the given clients and platform with the production confirm
/// delay (pair with a paused clock in tests).
pub fn create_engine(clients: ClientSet, platform: Arc<MockPublishPlatform>) -> WorkflowEngine {
    let register = Arc::new(PublishRegister::new(platform));
    WorkflowEngine::new(clients, register, GlobalSettings::default(), Vec::new())
}

/// Engine over all-success clients and platform.
pub fn create_success_engine() -> WorkflowEngine {
    create_engine(ClientSet::mocks(), Arc::new(MockPublishPlatform::success()))
}

/// Engine whose register confirms after `delay` instead of the default.
#[allow(dead_code)]
pub fn create_engine_with_confirm_delay(
    clients: ClientSet,
    platform: Arc<MockPublishPlatform>,
    delay: Duration,
) -> WorkflowEngine {
    let register = Arc::new(PublishRegister::with_confirm_delay(platform, delay));
    WorkflowEngine::new(clients, register, GlobalSettings::default(), Vec::new())
}
