//! Shared helpers for integration tests: mock fal.ai endpoints and test
//! configuration pointing at them.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use prompt2video::config::FalConfig;

/// Queue model identifier used by all tests.
pub const VIDEO_MODEL: &str = "fal-ai/test-video";

/// Request ID handed out by the mock queue.
pub const REQUEST_ID: &str = "req-1";

/// Body served for the generated video file.
pub const MP4_BYTES: &[u8] = b"not really an mp4, but enough for a download";

/// fal.ai settings pointing every endpoint at the mock server, with a short
/// poll interval so tests finish quickly.
pub fn fal_config(server: &MockServer) -> FalConfig {
    FalConfig {
        api_key: Some("test-key".to_string()),
        image_model_url: format!("{}/image-model", server.uri()),
        video_model: VIDEO_MODEL.to_string(),
        queue_base_url: server.uri(),
        generation_timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(10),
    }
}

/// Mount the image model endpoint returning the given response body.
pub async fn mount_image_model(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/image-model"))
        .and(header("Authorization", "Key test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the full happy path: image model, queue submit, one in-progress
/// poll with a log line, completion, the result payload, and the video file.
pub async fn mount_happy_path(server: &MockServer) {
    let image_url = format!("{}/files/img.png", server.uri());
    let video_url = format!("{}/files/out.mp4", server.uri());

    mount_image_model(server, json!({"images": [{"url": image_url}]})).await;

    Mock::given(method("POST"))
        .and(path(format!("/{}", VIDEO_MODEL)))
        .and(header("Authorization", "Key test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"request_id": REQUEST_ID})),
        )
        .mount(server)
        .await;

    // First poll reports progress with a log line, later polls completion.
    Mock::given(method("GET"))
        .and(path(format!(
            "/{}/requests/{}/status",
            VIDEO_MODEL, REQUEST_ID
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "IN_PROGRESS",
            "logs": [{"message": "rendering frames"}]
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/{}/requests/{}/status",
            VIDEO_MODEL, REQUEST_ID
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "COMPLETED",
            "logs": [{"message": "rendering frames"}, {"message": "done"}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/{}/requests/{}", VIDEO_MODEL, REQUEST_ID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"video": {"url": video_url}})),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/out.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(MP4_BYTES))
        .mount(server)
        .await;
}

/// Assert that a file name looks like `video-<digits>.mp4`.
pub fn assert_video_file_name(name: &str) {
    let digits = name
        .strip_prefix("video-")
        .and_then(|rest| rest.strip_suffix(".mp4"))
        .unwrap_or_else(|| panic!("unexpected file name: {}", name));
    assert!(
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()),
        "unexpected file name: {}",
        name
    );
}
