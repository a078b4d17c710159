//! Instagram Graph API adapter for the two-phase publish protocol.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::clients::base::{ClientError, PublishPlatform};
use crate::config::models::InstagramConfig;

pub struct InstagramClient {
    http: reqwest::Client,
    access_token: Option<String>,
    account_id: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

/// Graph API error envelope: `{"error": {"message", "type", "code"}}`.
#[derive(Deserialize, Default)]
struct GraphErrorBody {
    #[serde(default)]
    error: Option<GraphError>,
}

#[derive(Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    code: i64,
}

impl InstagramClient {
    pub fn from_config(config: &InstagramConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            access_token: config.access_token.clone(),
            account_id: config.account_id.clone(),
            base_url: config.base_url.clone(),
        }
    }

    fn credentials(&self) -> Result<(&str, &str), ClientError> {
        let token = self
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::MissingCredentials("Instagram access token is not set".to_string())
            })?;
        let account = self
            .account_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| {
                ClientError::MissingCredentials("Instagram account id is not set".to_string())
            })?;
        Ok((token, account))
    }

    async fn post_graph(
        &self,
        path: &str,
        body: serde_json::Value,
        operation: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .http
            .post(format!("{}/{path}", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Instagram {operation} call failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to read Instagram response: {e}")))?;

        if !status.is_success() {
            return Err(ClientError::Upstream(format_graph_error(operation, &text)));
        }

        let parsed: IdResponse = serde_json::from_str(&text).map_err(|e| {
            ClientError::Upstream(format!("malformed Instagram {operation} response: {e}"))
        })?;

        Ok(parsed.id)
    }
}

#[async_trait]
impl PublishPlatform for InstagramClient {
    async fn check_availability(&self) -> bool {
        self.credentials().is_ok()
    }

    async fn create_container(
        &self,
        media_url: &str,
        caption: &str,
    ) -> Result<String, ClientError> {
        let (token, account) = self.credentials()?;

        let body = json!({
            "media_type": "REELS",
            "video_url": media_url,
            "caption": caption,
            "access_token": token,
        });

        self.post_graph(&format!("{account}/media"), body, "container creation")
            .await
    }

    async fn confirm(&self, container_id: &str) -> Result<String, ClientError> {
        let (token, account) = self.credentials()?;

        let body = json!({
            "creation_id": container_id,
            "access_token": token,
        });

        self.post_graph(&format!("{account}/media_publish"), body, "publish confirm")
            .await
    }
}

/// Surface the platform's own diagnostic when it sent one; otherwise fall
/// back to the raw body.
fn format_graph_error(operation: &str, body: &str) -> String {
    let parsed: GraphErrorBody = serde_json::from_str(body).unwrap_or_default();
    match parsed.error {
        Some(error) => format!(
            "Instagram rejected the {operation}: {} (type={}, code={})",
            error.message, error.error_type, error.code
        ),
        None => format!("Instagram {operation} failed: {body}"),
    }
}
