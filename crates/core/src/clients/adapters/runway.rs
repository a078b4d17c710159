//! Runway adapter for image-to-video generation.
//!
//! The provider uses an explicit create-task/poll-status protocol; this
//! adapter hides the polling behind one awaitable call.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

use crate::clients::base::{ClientError, VideoGenerator};
use crate::config::models::RunwayConfig;
use rk_protocol::{CroppedImage, GeneratedVideo, VideoDuration};

const API_VERSION: &str = "2024-11-06";

pub struct RunwayClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    poll_interval: Duration,
    max_wait: Duration,
}

#[derive(Deserialize)]
struct CreateTaskResponse {
    id: String,
}

#[derive(Deserialize)]
struct TaskStatusResponse {
    status: TaskState,
    #[serde(default)]
    output: Vec<String>,
    #[serde(default)]
    failure: Option<String>,
}

/// Provider-side task states we care about; anything unrecognized is treated
/// as still-running.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RunwayClient {
    pub fn from_config(config: &RunwayConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_wait: Duration::from_secs(config.max_wait_secs),
        }
    }

    fn require_key(&self) -> Result<&str, ClientError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ClientError::MissingCredentials("Runway API key is not set".to_string()))
    }

    async fn create_task(
        &self,
        image: &CroppedImage,
        prompt: &str,
        duration: VideoDuration,
    ) -> Result<String, ClientError> {
        let key = self.require_key()?;

        let body = json!({
            "model": self.model,
            "promptImage": image.reference,
            "promptText": prompt,
            "duration": duration.seconds(),
            "ratio": "768:1280",
        });

        let response = self
            .http
            .post(format!("{}/v1/image_to_video", self.base_url))
            .bearer_auth(key)
            .header("X-Runway-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Runway create call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Upstream(format!(
                "Runway rejected the generation task ({status}): {detail}"
            )));
        }

        let created: CreateTaskResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Upstream(format!("malformed Runway create response: {e}")))?;

        Ok(created.id)
    }

    async fn poll_task(&self, task_id: &str) -> Result<TaskStatusResponse, ClientError> {
        let key = self.require_key()?;

        let response = self
            .http
            .get(format!("{}/v1/tasks/{task_id}", self.base_url))
            .bearer_auth(key)
            .header("X-Runway-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Runway status call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClientError::Upstream(format!(
                "Runway status query failed ({status}): {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Upstream(format!("malformed Runway status response: {e}")))
    }
}

#[async_trait]
impl VideoGenerator for RunwayClient {
    async fn generate(
        &self,
        image: &CroppedImage,
        prompt: &str,
        duration: VideoDuration,
    ) -> Result<GeneratedVideo, ClientError> {
        let task_id = self.create_task(image, prompt, duration).await?;
        let started = Instant::now();

        loop {
            if started.elapsed() >= self.max_wait {
                return Err(ClientError::Timeout(format!(
                    "Runway task {task_id} did not finish within {}s",
                    self.max_wait.as_secs()
                )));
            }

            tokio::time::sleep(self.poll_interval).await;

            let task = self.poll_task(&task_id).await?;
            match task.status {
                TaskState::Succeeded => {
                    let video_url = task.output.into_iter().next().ok_or_else(|| {
                        ClientError::Upstream(format!(
                            "Runway task {task_id} succeeded without an output URL"
                        ))
                    })?;
                    return Ok(GeneratedVideo {
                        video_url,
                        task_id: Some(task_id),
                    });
                }
                TaskState::Failed => {
                    let reason = task.failure.unwrap_or_else(|| "no failure detail".to_string());
                    return Err(ClientError::Upstream(format!(
                        "Runway task {task_id} failed: {reason}"
                    )));
                }
                TaskState::Pending | TaskState::Running | TaskState::Unknown => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_state_deserialization() {
        let task: TaskStatusResponse = serde_json::from_str(
            r#"{"status": "SUCCEEDED", "output": ["https://cdn/x.mp4"]}"#,
        )
        .expect("should deserialize");
        assert_eq!(task.status, TaskState::Succeeded);
        assert_eq!(task.output, vec!["https://cdn/x.mp4"]);

        let task: TaskStatusResponse =
            serde_json::from_str(r#"{"status": "FAILED", "failure": "nsfw"}"#)
                .expect("should deserialize");
        assert_eq!(task.status, TaskState::Failed);
        assert_eq!(task.failure.as_deref(), Some("nsfw"));
    }

    #[test]
    fn test_unrecognized_state_is_still_running() {
        let task: TaskStatusResponse =
            serde_json::from_str(r#"{"status": "THROTTLED"}"#).expect("should deserialize");
        assert_eq!(task.status, TaskState::Unknown);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_any_call() {
        let config = RunwayConfig::default();
        let client = RunwayClient::from_config(&config, reqwest::Client::new());

        let image = CroppedImage {
            reference: "data:image/jpeg;base64,AAAA".to_string(),
            width: 720,
            height: 1280,
        };
        let result = client.generate(&image, "pan", VideoDuration::Short).await;
        assert!(matches!(result, Err(ClientError::MissingCredentials(_))));
    }
}
