//! HTTP surface: the generate endpoint plus static file serving.
//!
//! The router is deliberately thin; all pipeline behavior lives in
//! [`crate::pipeline`]. Errors are converted here into the uniform JSON
//! error shape and never leak raw upstream bodies to the caller.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

use crate::pipeline::VideoPipeline;

/// Shared application state: one pipeline for all requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<VideoPipeline>,
}

/// Request body for `POST /api/generate-video`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Success response for `POST /api/generate-video`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub file_name: String,
    /// Local URL served by this app.
    pub download_url: String,
    /// Original remote URL from fal.ai (for debugging).
    pub video_url: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Build the application router.
///
/// `/outputs` serves the generated videos; everything else falls back to the
/// static frontend in `public_dir`.
pub fn router(state: AppState, output_dir: &Path, public_dir: &Path) -> Router {
    Router::new()
        .route("/api/generate-video", post(generate_video))
        .nest_service("/outputs", ServeDir::new(output_dir))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

async fn generate_video(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    let prompt = request.prompt.trim();

    if prompt.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Prompt is required.".to_string(),
                details: None,
            }),
        )
            .into_response();
    }

    match state.pipeline.run(prompt).await {
        Ok(video) => (
            StatusCode::OK,
            Json(GenerateResponse {
                success: true,
                file_name: video.file_name,
                download_url: video.download_url,
                video_url: video.video_url,
            }),
        )
            .into_response(),
        Err(err) => {
            log::error!("Error generating video: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to generate video.".to_string(),
                    details: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_missing_prompt_defaults_to_empty() {
        let request: GenerateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.prompt, "");
    }

    #[test]
    fn test_generate_response_uses_camel_case() {
        let response = GenerateResponse {
            success: true,
            file_name: "video-123.mp4".to_string(),
            download_url: "/outputs/video-123.mp4".to_string(),
            video_url: "http://x/out.mp4".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""fileName":"video-123.mp4""#));
        assert!(json.contains(r#""downloadUrl":"/outputs/video-123.mp4""#));
        assert!(json.contains(r#""videoUrl":"http://x/out.mp4""#));
    }

    #[test]
    fn test_error_response_omits_missing_details() {
        let response = ErrorResponse {
            error: "Prompt is required.".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"error":"Prompt is required."}"#);
    }
}
