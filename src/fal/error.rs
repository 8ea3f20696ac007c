//! Error types for fal.ai operations.

/// Errors that can occur during fal.ai operations.
#[derive(Debug, thiserror::Error)]
pub enum FalError {
    #[error("FAL_API_KEY is not configured")]
    MissingApiKey,

    #[error("empty prompt")]
    EmptyPrompt,

    #[error("fal.ai request failed with status {status}: {body}")]
    Upstream {
        /// HTTP status code returned by the upstream API
        status: u16,
        /// Response body text, as returned by the upstream API
        body: String,
    },

    #[error("fal.ai generation failed: {0}")]
    GenerationFailed(String),

    #[error("could not find {media} URL in fal.ai response")]
    Extraction {
        /// The media kind being extracted ("image" or "video")
        media: &'static str,
        /// The raw response that matched no known key path
        response: serde_json::Value,
    },

    #[error("video download failed with status {status}: {body}")]
    Download {
        /// HTTP status code returned for the download request
        status: u16,
        /// Response body text returned instead of the media
        body: String,
    },

    #[error("video download interrupted: {0}")]
    DownloadInterrupted(#[source] reqwest::Error),

    #[error("generation timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
