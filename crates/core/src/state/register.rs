//! Publish register: container tracking and deferred confirmation.
//!
//! The register owns the in-memory table of publish containers. Creating a
//! container arms a one-shot timer that fires the confirm call after a fixed
//! delay with no caller involvement; the original request cycle completes as
//! soon as the create call succeeds. Callers wanting the final outcome poll
//! [`PublishRegister::get_status`].

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::clients::base::{ClientError, PublishPlatform};
use rk_protocol::{PublishContainer, PublishOutcome, PublishStatus};

/// Platform-required wait between container creation and publish confirm.
pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_secs(60);

/// Tracks externally-created publish containers and schedules their
/// confirmation.
///
/// Containers live in memory for the life of the process and are never
/// deleted. A restart loses any armed confirm timers; that data loss is
/// accepted for this system.
pub struct PublishRegister {
    /// Registry of all containers, keyed by the platform-issued id.
    containers: Arc<Mutex<HashMap<String, PublishContainer>>>,

    platform: Arc<dyn PublishPlatform>,

    confirm_delay: Duration,
}

impl PublishRegister {
    pub fn new(platform: Arc<dyn PublishPlatform>) -> Self {
        Self::with_confirm_delay(platform, DEFAULT_CONFIRM_DELAY)
    }

    /// Override the confirm delay. Used by tests and local dry runs.
    pub fn with_confirm_delay(platform: Arc<dyn PublishPlatform>, confirm_delay: Duration) -> Self {
        Self {
            containers: Arc::new(Mutex::new(HashMap::new())),
            platform,
            confirm_delay,
        }
    }

    /// Create a publish container and arm its deferred confirm.
    ///
    /// All failure paths resolve to a `PublishOutcome` with
    /// `success == false`; this method never returns an error. Credential
    /// absence fails synchronously without contacting the platform.
    pub async fn create_container(&self, media_url: &str, caption: &str) -> PublishOutcome {
        if !self.platform.check_availability().await {
            return PublishOutcome::failure(
                "Publish platform credentials are not configured; container not created",
            );
        }

        match self.platform.create_container(media_url, caption).await {
            Ok(container_id) => {
                let container = PublishContainer {
                    id: container_id.clone(),
                    media_url: media_url.to_string(),
                    caption: caption.to_string(),
                    created_at: Utc::now(),
                    status: PublishStatus::Processing,
                };

                {
                    let mut containers = self.containers.lock().await;
                    containers.insert(container_id.clone(), container);
                }

                self.arm_confirm_timer(container_id.clone());
                info!(
                    container_id = %container_id,
                    delay_secs = self.confirm_delay.as_secs(),
                    "publish container created; confirm scheduled"
                );

                PublishOutcome::success(
                    container_id.clone(),
                    format!(
                        "Publish container {container_id} created; confirmation scheduled in {}s",
                        self.confirm_delay.as_secs()
                    ),
                )
            }
            Err(error) => {
                warn!(%error, "publish container creation failed");
                let message = match &error {
                    ClientError::Upstream(detail) => {
                        format!("The platform rejected container creation: {detail}")
                    }
                    other => format!("Container creation failed before reaching the platform: {other}"),
                };
                PublishOutcome::failure(message)
            }
        }
    }

    /// Spawn the one-shot deferred confirm task for a freshly created
    /// container. Fire-and-forget: there is no cancellation handle.
    fn arm_confirm_timer(&self, container_id: String) {
        let containers = Arc::clone(&self.containers);
        let platform = Arc::clone(&self.platform);
        let delay = self.confirm_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::run_deferred_confirm(containers, platform, container_id).await;
        });
    }

    /// The deferred confirm step. Transitions the container to `Published`
    /// or `Failed`; a single failure is terminal, there is no retry.
    async fn run_deferred_confirm(
        containers: Arc<Mutex<HashMap<String, PublishContainer>>>,
        platform: Arc<dyn PublishPlatform>,
        container_id: String,
    ) {
        // A missing entry indicates a logic or lifetime bug, not a retried
        // condition. There is no caller left to notify.
        let known = containers.lock().await.contains_key(&container_id);
        if !known {
            error!(container_id = %container_id, "confirm timer fired for unknown container");
            return;
        }

        let confirm_result = platform.confirm(&container_id).await;

        let mut containers = containers.lock().await;
        let Some(container) = containers.get_mut(&container_id) else {
            error!(container_id = %container_id, "container disappeared during confirm");
            return;
        };

        match confirm_result {
            Ok(media_id) => {
                container.status = PublishStatus::Published;
                info!(container_id = %container_id, media_id = %media_id, "container published");
            }
            Err(confirm_error) => {
                container.status = PublishStatus::Failed;
                warn!(container_id = %container_id, error = %confirm_error, "publish confirm failed");
            }
        }
    }

    /// Current state of one container. Pure lookup, no side effects.
    pub async fn get_status(&self, container_id: &str) -> Option<PublishContainer> {
        let containers = self.containers.lock().await;
        containers.get(container_id).cloned()
    }

    /// All tracked containers.
    pub async fn list_all(&self) -> Vec<PublishContainer> {
        let containers = self.containers.lock().await;
        containers.values().cloned().collect()
    }

    /// Number of tracked containers.
    pub async fn container_count(&self) -> usize {
        let containers = self.containers.lock().await;
        containers.len()
    }
}
