//! OpenAI adapter for prompt and caption generation.
//!
//! One client implements both text capabilities: the vision-driven motion
//! description and the caption+hashtags call (JSON mode).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::clients::base::{
    CaptionGenerator, CaptionSource, ClientError, PromptGenerator,
};
use crate::config::models::OpenAiConfig;
use rk_protocol::{CaptionBundle, CaptionOptions};

const MOTION_SYSTEM_PROMPT: &str = "You are a film director. Describe, in one paragraph, \
a single cinematic camera motion that would bring this still image to life as a short \
social video. Mention camera movement, pacing, and lighting. Reply with the description \
only.";

const CAPTION_SYSTEM_PROMPT: &str = "You write social media captions. Reply with a JSON \
object of the shape {\"caption\": string, \"hashtags\": [string]} and nothing else.";

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &OpenAiConfig, http: reqwest::Client) -> Self {
        Self::new(
            http,
            config.api_key.clone(),
            config.model.clone(),
            config.base_url.clone(),
        )
    }

    fn require_key(&self) -> Result<&str, ClientError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ClientError::MissingCredentials("OpenAI API key is not set".to_string()))
    }

    /// One chat-completions call; returns the first choice's content.
    async fn chat(&self, body: serde_json::Value) -> Result<String, ClientError> {
        let key = self.require_key()?;

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read OpenAI response: {e}")))?;

        if !status.is_success() {
            let detail = payload["error"]["message"]
                .as_str()
                .unwrap_or("no error detail");
            return Err(ClientError::Upstream(format!(
                "OpenAI returned {status}: {detail}"
            )));
        }

        extract_message_content(&payload)
    }
}

#[async_trait]
impl PromptGenerator for OpenAiClient {
    async fn describe_motion(&self, image: &rk_protocol::CroppedImage) -> Result<String, ClientError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": MOTION_SYSTEM_PROMPT},
                {"role": "user", "content": [
                    {"type": "image_url", "image_url": {"url": image.reference}}
                ]}
            ]
        });

        let content = self.chat(body).await?;
        let text = content.trim();
        if text.is_empty() {
            return Err(ClientError::Upstream(
                "OpenAI returned an empty motion description".to_string(),
            ));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl CaptionGenerator for OpenAiClient {
    async fn generate(
        &self,
        source: CaptionSource<'_>,
        options: &CaptionOptions,
    ) -> Result<CaptionBundle, ClientError> {
        let instruction = build_caption_instruction(options);
        let user_content = match source {
            CaptionSource::Image(image) => json!([
                {"type": "text", "text": instruction},
                {"type": "image_url", "image_url": {"url": image.reference}}
            ]),
            CaptionSource::Prompt(prompt) => {
                json!(format!("{instruction}\n\nThe video shows: {prompt}"))
            }
        };

        let body = json!({
            "model": self.model,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": CAPTION_SYSTEM_PROMPT},
                {"role": "user", "content": user_content}
            ]
        });

        let content = self.chat(body).await?;
        parse_caption_payload(&content, options)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions payload.
fn extract_message_content(payload: &serde_json::Value) -> Result<String, ClientError> {
    payload["choices"][0]["message"]["content"]
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| {
            ClientError::Upstream("malformed OpenAI response: no message content".to_string())
        })
}

/// Build the user-facing caption instruction from the options.
fn build_caption_instruction(options: &CaptionOptions) -> String {
    let mut instruction = format!(
        "Write a {} caption of at most {} characters for a short social video, \
plus up to {} hashtags.",
        options.tone, options.max_caption_length, options.max_hashtags
    );
    if let Some(audience) = &options.target_audience {
        instruction.push_str(&format!(" Target audience: {audience}."));
    }
    if options.include_call_to_action {
        instruction.push_str(" End the caption with a short call to action.");
    }
    instruction
}

/// Parse the model's JSON reply into a caption bundle, tolerating markdown
/// code fences and enforcing the configured limits.
fn parse_caption_payload(
    content: &str,
    options: &CaptionOptions,
) -> Result<CaptionBundle, ClientError> {
    #[derive(Deserialize)]
    struct RawCaption {
        caption: String,
        #[serde(default)]
        hashtags: Vec<String>,
    }

    let stripped = strip_code_fences(content);
    let raw: RawCaption = serde_json::from_str(stripped).map_err(|e| {
        ClientError::Upstream(format!("malformed caption payload from OpenAI: {e}"))
    })?;

    let caption: String = raw.caption.chars().take(options.max_caption_length).collect();
    if caption.trim().is_empty() {
        return Err(ClientError::Upstream(
            "OpenAI returned an empty caption".to_string(),
        ));
    }

    let hashtags = raw
        .hashtags
        .into_iter()
        .map(|tag| {
            let tag = tag.trim().to_string();
            if tag.starts_with('#') {
                tag
            } else {
                format!("#{tag}")
            }
        })
        .filter(|tag| tag.len() > 1)
        .take(options.max_hashtags)
        .collect();

    Ok(CaptionBundle { caption, hashtags })
}

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
