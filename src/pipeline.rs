//! Prompt-to-video pipeline.
//!
//! Composes the fal.ai clients into a single linear run:
//! prompt -> image URL -> video URL -> downloaded file. Steps run strictly
//! in sequence; the first failure aborts the run and no file is reported.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::FalConfig;
use crate::fal::{
    download_to_file, validate_prompt, FalError, ImageClient, QueueUpdate, VideoClient,
    DEFAULT_CONNECT_TIMEOUT,
};

/// A successfully generated and downloaded video.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    /// File name inside the output directory, `video-<epoch-millis>.mp4`.
    pub file_name: String,
    /// Absolute or relative path of the file on disk.
    pub file_path: PathBuf,
    /// Local URL under which the file is served (`/outputs/<file_name>`).
    pub download_url: String,
    /// Original remote URL from fal.ai (for diagnostics).
    pub video_url: String,
    /// Size of the downloaded file in bytes.
    pub bytes_written: u64,
}

/// The full prompt-to-video pipeline.
///
/// Holds one client per step plus a dedicated download client. Safe to share
/// across concurrent requests; the only shared resource is the output
/// directory, which is append-only.
pub struct VideoPipeline {
    image: ImageClient,
    video: VideoClient,
    download_client: reqwest::Client,
    output_dir: PathBuf,
}

impl VideoPipeline {
    /// Create a pipeline from the process-wide fal.ai settings and an
    /// output directory.
    pub fn new(config: FalConfig, output_dir: PathBuf) -> Result<Self, FalError> {
        // No total-request timeout on the download client: video bodies can
        // be large and stream slowly.
        let download_client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            image: ImageClient::new(config.clone())?,
            video: VideoClient::new(config)?,
            download_client,
            output_dir,
        })
    }

    /// Attach a progress observer for the video generation step.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&QueueUpdate) + Send + Sync + 'static,
    {
        self.video = self.video.with_observer(observer);
        self
    }

    /// Get the output directory.
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Run the full pipeline for one prompt.
    ///
    /// # Errors
    ///
    /// Returns `FalError::EmptyPrompt` for blank prompts (no network call is
    /// made), or whichever error the failing step produced. Nothing is
    /// retried and no partial result is returned.
    pub async fn run(&self, prompt: &str) -> Result<GeneratedVideo, FalError> {
        validate_prompt(prompt)?;
        let prompt = prompt.trim();

        log::info!("Starting video generation for prompt: {}", prompt);

        let image_url = self.image.generate(prompt).await?;
        log::info!("Image ready: {}", image_url);

        let video_url = self.video.generate(&image_url, prompt).await?;
        log::info!("Video ready: {}", video_url);

        let file_name = next_file_name();
        let file_path = self.output_dir.join(&file_name);
        let bytes_written =
            download_to_file(&self.download_client, &video_url, &file_path).await?;
        log::info!("Downloaded {} bytes to {:?}", bytes_written, file_path);

        let download_url = format!("/outputs/{}", file_name);
        Ok(GeneratedVideo {
            file_name,
            file_path,
            download_url,
            video_url,
            bytes_written,
        })
    }
}

/// Millisecond stamp of the most recently assigned file name.
///
/// Names are timestamp-based; when two runs finish in the same millisecond
/// the stamp is bumped forward so sequential requests always get distinct
/// names.
static LAST_STAMP_MS: AtomicU64 = AtomicU64::new(0);

fn next_file_name() -> String {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64;

    let previous = LAST_STAMP_MS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now_ms.max(last + 1))
        })
        .unwrap_or(0);
    let stamp = now_ms.max(previous + 1);

    format!("video-{}.mp4", stamp)
}
