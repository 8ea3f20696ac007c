//! Text-to-image generation against a synchronous fal.ai model URL.

use serde::Serialize;

use crate::config::FalConfig;

use super::error::FalError;
use super::extract::{extract_url, IMAGE_URL_PATHS};
use super::{validate_prompt, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};

/// Request body for image generation.
#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    /// The text prompt to generate an image from.
    prompt: &'a str,
}

/// Client for the text-to-image step.
///
/// The configured model URL is called once per request; the response body is
/// parsed as loose JSON and the image URL extracted from it.
pub struct ImageClient {
    config: FalConfig,
    http_client: reqwest::Client,
}

impl ImageClient {
    /// Create a new ImageClient from the process-wide fal.ai settings.
    pub fn new(config: FalConfig) -> Result<Self, FalError> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get the configured model URL.
    pub fn model_url(&self) -> &str {
        &self.config.image_model_url
    }

    /// Generate an image from a text prompt and return its URL.
    ///
    /// # Errors
    ///
    /// Returns `FalError::MissingApiKey` if no credential is configured (checked
    /// before any network call), `FalError::Upstream` on a non-2xx response,
    /// `FalError::Extraction` if no known key path matches the response body,
    /// or `FalError::Http` if the request itself fails.
    pub async fn generate(&self, prompt: &str) -> Result<String, FalError> {
        validate_prompt(prompt)?;
        let api_key = self.config.require_api_key()?;

        let response = self
            .http_client
            .post(&self.config.image_model_url)
            .header("Authorization", format!("Key {}", api_key))
            .header("Accept", "application/json")
            .json(&ImageRequest { prompt })
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

        match extract_url(&data, IMAGE_URL_PATHS) {
            Some(url) => Ok(url.to_string()),
            None => {
                log::error!("Unexpected fal.ai image response: {}", data);
                Err(FalError::Extraction {
                    media: "image",
                    response: data,
                })
            }
        }
    }
}
