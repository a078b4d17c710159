//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines
//! global settings, provider credentials, and motion-prompt templates into a
//! single configuration object.

use serde::Deserialize;

use crate::clients::base::AspectRatio;
use rk_protocol::{CaptionOptions, VideoDuration};

/// What the caption generator should be pointed at.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CaptionSourceKind {
    /// Caption the cropped source image.
    #[default]
    Image,

    /// Caption against the motion prompt text.
    Prompt,
}

/// Project-wide settings from the top of `config.toml`.
#[derive(Debug, Clone)]
pub struct GlobalSettings {
    /// Target aspect ratio for the image transform.
    pub aspect_ratio: AspectRatio,

    /// Named motion template to use instead of the vision prompt generator.
    pub motion_template: Option<String>,

    /// Fallback approval recipient when a run doesn't name one.
    pub default_recipient: Option<String>,

    /// Clip length used when a run doesn't request one.
    pub default_duration: VideoDuration,

    /// Whether captions are generated from the image or the prompt text.
    pub caption_source: CaptionSourceKind,

    /// Defaults for caption generation.
    pub caption: CaptionOptions,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::REELS,
            motion_template: None,
            default_recipient: None,
            default_duration: VideoDuration::Short,
            caption_source: CaptionSourceKind::Image,
            caption: CaptionOptions::default(),
        }
    }
}

/// `[openai]` provider table.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// `[runway]` provider table.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct RunwayConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,

    /// Seconds between task status polls.
    pub poll_interval_secs: u64,

    /// Overall wait budget for one generation task.
    pub max_wait_secs: u64,
}

impl Default for RunwayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gen3a_turbo".to_string(),
            base_url: "https://api.dev.runwayml.com".to_string(),
            poll_interval_secs: 5,
            max_wait_secs: 300,
        }
    }
}

/// `[resend]` provider table.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResendConfig {
    pub api_key: Option<String>,
    pub base_url: String,

    /// From-header for outgoing mail.
    pub from_address: String,

    /// Base URL the approve/reject action links point at.
    pub approval_base_url: String,
}

impl Default for ResendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.resend.com".to_string(),
            from_address: "Reel Kit <onboarding@resend.dev>".to_string(),
            approval_base_url: "http://localhost:8080/approval".to_string(),
        }
    }
}

/// `[instagram]` provider table.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct InstagramConfig {
    pub access_token: Option<String>,
    pub account_id: Option<String>,
    pub base_url: String,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            account_id: None,
            base_url: "https://graph.facebook.com/v21.0".to_string(),
        }
    }
}

/// One motion-prompt template from `templates/*.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,

    /// Clip length the template was written for; `None` fits any duration.
    pub duration: Option<VideoDuration>,

    /// The prompt text (the markdown body).
    pub body: String,
}

/// Unified application configuration loaded from the `.reel-kit/` directory.
///
/// Aggregates all configuration sources:
/// - `config.toml`: global settings and provider tables
/// - `templates/*.md`: motion-prompt templates
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub settings: GlobalSettings,
    pub openai: OpenAiConfig,
    pub runway: RunwayConfig,
    pub resend: ResendConfig,
    pub instagram: InstagramConfig,
    pub templates: Vec<PromptTemplate>,
}
