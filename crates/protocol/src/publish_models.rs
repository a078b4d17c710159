//! Publish container lifecycle state.
//!
//! A publish container is a platform-side staged-upload handle created before
//! a confirm call finalizes publication. Containers are tracked in memory by
//! the publish register for the life of the process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a publish container.
///
/// Only two transitions are ever assigned by current logic:
/// `Processing -> Published` and `Processing -> Failed`. `Pending` and
/// `Ready` stay in the type for a possible platform-side readiness check but
/// are never reached today.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishStatus {
    /// Accepted locally but not yet submitted to the platform.
    Pending,

    /// Created on the platform; confirm call is scheduled.
    Processing,

    /// Platform reports the media is ready to confirm.
    Ready,

    /// Confirm call succeeded. Terminal.
    Published,

    /// Confirm call failed. Terminal.
    Failed,
}

impl PublishStatus {
    /// True for states that no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, PublishStatus::Published | PublishStatus::Failed)
    }
}

/// One externally-created, asynchronously-completing publish request.
///
/// Keyed by the platform-issued container id. Created when the platform
/// accepts a create call, mutated only by the register's deferred confirm
/// handler, never deleted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishContainer {
    /// Platform-issued id, used as the lookup key.
    pub id: String,

    /// The video the container was created for.
    pub media_url: String,

    /// Full caption blob sent to the platform (caption plus hashtags).
    pub caption: String,

    pub created_at: DateTime<Utc>,

    pub status: PublishStatus,
}

impl PublishContainer {
    /// Seconds elapsed since the container was created.
    pub fn seconds_since_creation(&self) -> i64 {
        (Utc::now() - self.created_at).num_seconds()
    }
}

/// Result shape of container creation and of the approval callback.
///
/// This shape never carries an error value: all failure paths resolve to
/// `success == false` plus a human-readable message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,

    pub message: String,
}

impl PublishOutcome {
    pub fn success(container_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            container_id: Some(container_id.into()),
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            container_id: None,
            message: message.into(),
        }
    }
}
