//! Configuration file loader for the `.reel-kit/` directory structure.
//!
//! This module loads and parses all configuration files from the `.reel-kit/`
//! directory:
//! - `config.toml`: global settings and provider credential tables
//! - `templates/*.md`: motion-prompt templates with YAML front matter
//!
//! Credentials absent from `config.toml` fall back to environment variables.

use gray_matter::engine::YAML;
use gray_matter::Matter;
use serde::Deserialize;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::models::{
    AppConfig, CaptionSourceKind, GlobalSettings, InstagramConfig, OpenAiConfig, PromptTemplate,
    ResendConfig, RunwayConfig,
};
use rk_protocol::{CaptionOptions, VideoDuration};

/// Raw shape of `config.toml` before validation.
#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case", default)]
struct RawConfig {
    aspect_ratio: Option<String>,
    motion_template: Option<String>,
    default_recipient: Option<String>,
    default_duration: Option<VideoDuration>,
    caption_source: Option<CaptionSourceKind>,
    caption: CaptionOptions,
    openai: OpenAiConfig,
    runway: RunwayConfig,
    resend: ResendConfig,
    instagram: InstagramConfig,
}

/// Front matter of a `templates/*.md` file.
#[derive(Deserialize)]
struct TemplateFrontMatter {
    name: String,
    #[serde(default)]
    duration: Option<VideoDuration>,
}

/// Loads all configuration from the `.reel-kit/` directory.
///
/// If the directory does not exist, returns the default configuration rather
/// than an error. Missing credentials are not an error at load time either;
/// they surface later as unavailable clients.
///
/// # Errors
///
/// Returns `ConfigError` if files exist but cannot be read, have invalid
/// syntax, or carry invalid values (e.g. a malformed aspect ratio).
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let rk_dir = root.join(".reel-kit");

    if !rk_dir.exists() {
        let mut config = AppConfig::default();
        apply_env_fallbacks(&mut config, |key| std::env::var(key).ok());
        return Ok(config);
    }

    let raw = load_raw_config(&rk_dir)?;
    let settings = build_settings(&rk_dir, &raw)?;
    let templates = load_templates(&rk_dir)?;

    let mut config = AppConfig {
        settings,
        openai: raw.openai,
        runway: raw.runway,
        resend: raw.resend,
        instagram: raw.instagram,
        templates,
    };
    apply_env_fallbacks(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Loads and parses `config.toml`, or defaults when absent.
fn load_raw_config(rk_dir: &Path) -> ConfigResult<RawConfig> {
    let config_path = rk_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(RawConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Validates the raw settings into [`GlobalSettings`].
fn build_settings(rk_dir: &Path, raw: &RawConfig) -> ConfigResult<GlobalSettings> {
    let defaults = GlobalSettings::default();

    let aspect_ratio = match &raw.aspect_ratio {
        Some(value) => value.parse().map_err(|reason| ConfigError::InvalidConfig {
            path: rk_dir.join("config.toml"),
            reason,
        })?,
        None => defaults.aspect_ratio,
    };

    Ok(GlobalSettings {
        aspect_ratio,
        motion_template: raw.motion_template.clone(),
        default_recipient: raw.default_recipient.clone(),
        default_duration: raw.default_duration.unwrap_or(defaults.default_duration),
        caption_source: raw.caption_source.unwrap_or(defaults.caption_source),
        caption: raw.caption.clone(),
    })
}

/// Loads all motion-prompt templates from `templates/*.md`.
fn load_templates(rk_dir: &Path) -> ConfigResult<Vec<PromptTemplate>> {
    let templates_dir = rk_dir.join("templates");

    if !templates_dir.exists() {
        return Ok(Vec::new());
    }

    let mut templates = Vec::new();

    for entry in WalkDir::new(&templates_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: templates_dir.clone(),
            source,
        })?;

        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let matter = Matter::<YAML>::new();
        let result = matter.parse(&content);

        let front: TemplateFrontMatter = result
            .data
            .ok_or_else(|| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: "Missing YAML front matter".to_string(),
            })?
            .deserialize()
            .map_err(|e| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: format!("Failed to deserialize front matter: {e}"),
            })?;

        let body = result.content.trim().to_string();
        if body.is_empty() {
            return Err(ConfigError::InvalidConfig {
                path: path.to_path_buf(),
                reason: "template body is empty".to_string(),
            });
        }

        templates.push(PromptTemplate {
            name: front.name,
            duration: front.duration,
            body,
        });
    }

    Ok(templates)
}

/// Fill missing credentials from the environment.
///
/// Only empty/absent values are replaced; `config.toml` always wins.
fn apply_env_fallbacks(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    fn fill(slot: &mut Option<String>, value: Option<String>) {
        let missing = slot.as_deref().is_none_or(str::is_empty);
        if missing {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }
    }

    fill(&mut config.openai.api_key, lookup("OPENAI_API_KEY"));
    fill(&mut config.runway.api_key, lookup("RUNWAY_API_KEY"));
    fill(&mut config.resend.api_key, lookup("RESEND_API_KEY"));
    fill(
        &mut config.instagram.access_token,
        lookup("INSTAGRAM_ACCESS_TOKEN"),
    );
    fill(
        &mut config.instagram.account_id,
        lookup("INSTAGRAM_ACCOUNT_ID"),
    );
}
