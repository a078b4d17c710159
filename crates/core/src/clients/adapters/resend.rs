//! Resend adapter for transactional email.
//!
//! The only client with internal retry: 3 attempts with linear backoff
//! (2s/4s/6s), raising only after exhaustion.

use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

use crate::clients::base::{ClientError, Notifier};
use crate::config::models::ResendConfig;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(2);

pub struct ResendNotifier {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    from_address: String,
    approval_base_url: String,
    backoff_base: Duration,
}

impl ResendNotifier {
    pub fn from_config(config: &ResendConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            from_address: config.from_address.clone(),
            approval_base_url: config.approval_base_url.clone(),
            backoff_base: BACKOFF_BASE,
        }
    }

    /// Shrink the retry backoff, for tests.
    #[doc(hidden)]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    fn require_key(&self) -> Result<&str, ClientError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ClientError::MissingCredentials("Resend API key is not set".to_string()))
    }

    async fn send_once(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
    ) -> Result<(), ClientError> {
        let key = self.require_key()?;

        let body = json!({
            "from": self.from_address,
            "to": [recipient],
            "subject": subject,
            "html": html,
        });

        let response = self
            .http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("email send failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Upstream(format!(
                "Resend returned {status}: {detail}"
            )));
        }

        Ok(())
    }

    /// Deliver with retry. Credential absence is not retried.
    async fn deliver(&self, recipient: &str, subject: &str, html: &str) -> Result<(), ClientError> {
        self.require_key()?;

        let mut last_error = None;
        for attempt in 1..=MAX_ATTEMPTS {
            match self.send_once(recipient, subject, html).await {
                Ok(()) => return Ok(()),
                Err(error) => {
                    warn!(attempt, %error, "email delivery attempt failed");
                    last_error = Some(error);
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(backoff_delay(attempt, self.backoff_base)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ClientError::Transport("email delivery failed".to_string())))
    }

    fn action_url(&self, action: &str, video_url: &str, caption: &str, hashtags: &[String]) -> String {
        let params = [
            ("action", action),
            ("videoUrl", video_url),
            ("caption", caption),
        ];
        let mut url = match reqwest::Url::parse_with_params(&self.approval_base_url, params) {
            Ok(url) => url,
            // A malformed base URL still yields a visible (if dead) link.
            Err(_) => return format!("{}?action={action}", self.approval_base_url),
        };
        if !hashtags.is_empty() {
            url.query_pairs_mut()
                .append_pair("hashtags", &hashtags.join(","));
        }
        url.to_string()
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send_approval(&self, recipient: &str) -> Result<(), ClientError> {
        let html = "<p>Your approval was received. The video is being published.</p>".to_string();
        self.deliver(recipient, "Reel approved", &html).await
    }

    async fn send_content_package(
        &self,
        recipient: &str,
        video_url: &str,
        caption: &str,
        hashtags: &[String],
    ) -> Result<(), ClientError> {
        let approve = self.action_url("approve", video_url, caption, hashtags);
        let reject = self.action_url("reject", video_url, caption, hashtags);
        let html = build_package_html(video_url, caption, hashtags, &approve, &reject);
        self.deliver(recipient, "Today's reel is ready for review", &html)
            .await
    }
}

/// Delay before the next attempt: 2s after the first failure, 4s after the
/// second, 6s after the third.
fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    base * attempt
}

fn build_package_html(
    video_url: &str,
    caption: &str,
    hashtags: &[String],
    approve_url: &str,
    reject_url: &str,
) -> String {
    let hashtag_line = if hashtags.is_empty() {
        String::new()
    } else {
        format!("<p>{}</p>", hashtags.join(" "))
    };

    format!(
        "<h2>Today's reel is ready</h2>\
<p><a href=\"{video_url}\">Watch the video</a></p>\
<p>{caption}</p>\
{hashtag_line}\
<p><a href=\"{approve_url}\">Approve &amp; publish</a> &middot; \
<a href=\"{reject_url}\">Reject</a></p>"
    )
}
