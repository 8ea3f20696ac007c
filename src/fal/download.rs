//! Streaming download of generated media to the local filesystem.

use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use super::error::FalError;

/// Download `url` into `dest`, streaming the body to disk.
///
/// The body is never buffered in full; each chunk is written as it arrives.
/// Returns the number of bytes written. On failure the destination file may
/// be left partially written; callers treat the run as failed either way and
/// the file is simply never reported to the caller.
///
/// # Errors
///
/// Returns `FalError::Download` on a non-2xx response,
/// `FalError::DownloadInterrupted` if the stream errors mid-transfer, or
/// `FalError::Io` if writing to disk fails.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, FalError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(FalError::Download { status, body });
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(FalError::DownloadInterrupted)?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;

    Ok(written)
}
