//! Image-to-video generation against the fal.ai queue API.
//!
//! The queue flow is submit, poll, fetch: the job is POSTed to the queue,
//! its status endpoint is polled until it resolves, and the completed
//! payload is fetched separately. Progress events and log lines observed
//! while polling are informational only and never affect the control path.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::FalConfig;

use super::error::FalError;
use super::extract::{extract_url, VIDEO_URL_PATHS};
use super::{validate_prompt, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};

/// Request body for video generation.
#[derive(Debug, Serialize)]
struct VideoRequest<'a> {
    /// URL of the first frame, produced by the text-to-image step.
    image_url: &'a str,
    /// The text prompt guiding the video.
    prompt: &'a str,
}

/// Response from queue submission.
#[derive(Debug, Deserialize)]
pub struct QueueResponse {
    /// The unique request ID for polling.
    pub request_id: String,
    /// URL to check status (optional).
    #[serde(default)]
    pub status_url: Option<String>,
    /// URL of the completed payload (optional).
    #[serde(default)]
    pub response_url: Option<String>,
}

/// Response from the status polling endpoint.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    /// The status of the generation request.
    status: String,
    /// Log lines emitted so far, cumulative across polls.
    #[serde(default)]
    logs: Vec<LogEntry>,
    /// Error message if generation failed.
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    #[serde(default)]
    message: String,
}

/// Queue state reported while a video job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueStatus {
    /// Request is queued for processing.
    Queued,
    /// Video is being generated.
    InProgress,
    /// Generation completed successfully.
    Completed,
    /// Generation failed on the server.
    Failed,
}

/// A progress event forwarded to the observer during polling.
#[derive(Debug, Clone)]
pub struct QueueUpdate {
    pub status: QueueStatus,
    /// Log line associated with the event, if any.
    pub message: Option<String>,
}

type Observer = Box<dyn Fn(&QueueUpdate) + Send + Sync>;

/// Client for the image-to-video step.
pub struct VideoClient {
    config: FalConfig,
    http_client: reqwest::Client,
    observer: Option<Observer>,
}

impl VideoClient {
    /// Create a new VideoClient from the process-wide fal.ai settings.
    pub fn new(config: FalConfig) -> Result<Self, FalError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            config,
            http_client,
            observer: None,
        })
    }

    /// Attach a progress observer.
    ///
    /// The observer is invoked zero or more times per generation with status
    /// transitions and streamed log lines. It is infallible by construction
    /// and cannot influence the outcome of the generation.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&QueueUpdate) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Get the configured queue model identifier.
    pub fn model(&self) -> &str {
        &self.config.video_model
    }

    /// Generate a video from an image URL and a prompt, returning the
    /// remote URL of the finished video.
    ///
    /// Blocks (cooperatively) until the queue job resolves or the configured
    /// generation timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns `FalError::MissingApiKey` if no credential is configured,
    /// `FalError::Upstream` on a non-2xx response from any queue endpoint,
    /// `FalError::GenerationFailed` if the job ends in a failed state,
    /// `FalError::Timeout` if the job does not resolve in time, or
    /// `FalError::Extraction` if the completed payload matches no known
    /// key path.
    pub async fn generate(&self, image_url: &str, prompt: &str) -> Result<String, FalError> {
        validate_prompt(prompt)?;
        self.config.require_api_key()?;

        let queued = self.submit(image_url, prompt).await?;
        let request_id = queued.request_id;
        log::info!("Video generation submitted, request_id: {}", request_id);

        let started = Instant::now();
        let mut logs_seen = 0usize;
        let mut last_status: Option<QueueStatus> = None;

        loop {
            if started.elapsed() > self.config.generation_timeout {
                log::error!(
                    "Video generation timed out after {:?}",
                    self.config.generation_timeout
                );
                return Err(FalError::Timeout);
            }

            let status = self.poll_status(&request_id, &mut logs_seen).await?;

            if last_status != Some(status) {
                last_status = Some(status);
                self.notify(&QueueUpdate {
                    status,
                    message: None,
                });
            }

            match status {
                QueueStatus::Queued => log::debug!("Status: queued, waiting..."),
                QueueStatus::InProgress => log::debug!("Status: generating..."),
                QueueStatus::Completed => break,
                QueueStatus::Failed => {
                    // Unreachable: poll_status returns Err for failed jobs
                    return Err(FalError::GenerationFailed("generation failed".to_string()));
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        log::info!("Video generation complete, fetching result payload");
        self.fetch_result(&request_id).await
    }

    /// Submit a generation job to the fal.ai queue.
    async fn submit(&self, image_url: &str, prompt: &str) -> Result<QueueResponse, FalError> {
        let api_key = self.config.require_api_key()?;
        let url = format!("{}/{}", self.config.queue_base_url, self.config.video_model);

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Key {}", api_key))
            .header("Accept", "application/json")
            .json(&VideoRequest { image_url, prompt })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FalError::Upstream { status, body });
        }

        let queued: QueueResponse = response.json().await?;
        Ok(queued)
    }

    /// Poll the status endpoint once.
    ///
    /// New log lines since the previous poll are forwarded to the observer.
    /// A failed job surfaces as `FalError::GenerationFailed` carrying the
    /// server-side error message.
    async fn poll_status(
        &self,
        request_id: &str,
        logs_seen: &mut usize,
    ) -> Result<QueueStatus, FalError> {
        let url = format!(
            "{}/{}/requests/{}/status?logs=1",
            self.config.queue_base_url, self.config.video_model, request_id
        );

        let api_key = self.config.require_api_key()?;
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Key {}", api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FalError::Upstream { status, body });
        }

        let status_response: StatusResponse = response.json().await?;
        let status = parse_queue_status(&status_response.status).ok_or_else(|| {
            FalError::GenerationFailed(format!(
                "unknown queue status: {}",
                status_response.status
            ))
        })?;

        // The logs array is cumulative; only new entries are forwarded.
        for entry in status_response.logs.iter().skip(*logs_seen) {
            self.notify(&QueueUpdate {
                status,
                message: Some(entry.message.clone()),
            });
        }
        *logs_seen = (*logs_seen).max(status_response.logs.len());

        if status == QueueStatus::Failed {
            let error = status_response
                .error
                .unwrap_or_else(|| "unknown error during generation".to_string());
            log::error!("Video generation failed: {}", error);
            return Err(FalError::GenerationFailed(error));
        }

        Ok(status)
    }

    /// Fetch the completed payload and extract the video URL from it.
    async fn fetch_result(&self, request_id: &str) -> Result<String, FalError> {
        let url = format!(
            "{}/{}/requests/{}",
            self.config.queue_base_url, self.config.video_model, request_id
        );

        let api_key = self.config.require_api_key()?;
        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Key {}", api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FalError::Upstream { status, body });
        }

        let data: serde_json::Value = response.json().await?;

        match extract_url(&data, VIDEO_URL_PATHS) {
            Some(url) => Ok(url.to_string()),
            None => {
                log::error!("Unexpected fal.ai video response: {}", data);
                Err(FalError::Extraction {
                    media: "video",
                    response: data,
                })
            }
        }
    }

    fn notify(&self, update: &QueueUpdate) {
        match &self.observer {
            Some(observer) => observer(update),
            None => {
                if let Some(message) = &update.message {
                    log::info!("fal.ai: {}", message);
                }
            }
        }
    }
}

/// Map a fal.ai status string to a queue state.
fn parse_queue_status(status: &str) -> Option<QueueStatus> {
    match status.to_uppercase().as_str() {
        "PENDING" | "QUEUED" | "IN_QUEUE" => Some(QueueStatus::Queued),
        "PROCESSING" | "IN_PROGRESS" => Some(QueueStatus::InProgress),
        "COMPLETED" | "OK" => Some(QueueStatus::Completed),
        "FAILED" | "ERROR" => Some(QueueStatus::Failed),
        _ => None,
    }
}
