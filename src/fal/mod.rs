//! fal.ai API integration.
//!
//! This module provides the clients used by the prompt-to-video pipeline:
//! text-to-image generation against a synchronous model URL, image-to-video
//! generation against the queue API, URL extraction from the loosely-typed
//! responses both return, and streaming download of the finished video.

use std::time::Duration;

mod download;
mod error;
mod extract;
mod image;
mod video;

pub use download::download_to_file;
pub use error::FalError;
pub use extract::{extract_url, KeyPath, Segment, IMAGE_URL_PATHS, VIDEO_URL_PATHS};
pub use image::ImageClient;
pub use video::{QueueResponse, QueueStatus, QueueUpdate, VideoClient};

/// Default timeout for HTTP requests (30 seconds).
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validate a prompt before sending it to the API.
///
/// # Returns
/// `Ok(())` if the prompt is non-empty after trimming,
/// `Err(FalError::EmptyPrompt)` otherwise.
pub fn validate_prompt(prompt: &str) -> Result<(), FalError> {
    if prompt.trim().is_empty() {
        return Err(FalError::EmptyPrompt);
    }

    Ok(())
}
