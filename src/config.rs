//! Configuration file handling for prompt2video.
//!
//! Loads configuration from `config.toml` (or a custom path via `--config`)
//! once at startup. The fal.ai API key may also come from the `FAL_API_KEY`
//! environment variable, which takes precedence over the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fal::FalError;

/// The environment variable name for the fal.ai API key.
pub const FAL_API_KEY_ENV: &str = "FAL_API_KEY";

/// Default text-to-image model endpoint.
pub const DEFAULT_IMAGE_MODEL_URL: &str = "https://fal.run/fal-ai/nano-banana";

/// Default image-to-video model on the fal.ai queue.
pub const DEFAULT_VIDEO_MODEL: &str = "fal-ai/minimax-video/image-to-video";

/// Default base URL for the fal.ai queue API.
pub const DEFAULT_QUEUE_BASE_URL: &str = "https://queue.fal.run";

/// Configuration file structure for prompt2video.
/// Loaded from ./config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fal: FalSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            output_dir: default_output_dir(),
            public_dir: default_public_dir(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FalSection {
    /// API key; the FAL_API_KEY environment variable overrides this.
    pub api_key: Option<String>,
    #[serde(default = "default_image_model_url")]
    pub image_model_url: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
    #[serde(default = "default_queue_base_url")]
    pub queue_base_url: String,
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for FalSection {
    fn default() -> Self {
        Self {
            api_key: None,
            image_model_url: default_image_model_url(),
            video_model: default_video_model(),
            queue_base_url: default_queue_base_url(),
            generation_timeout_secs: default_generation_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_image_model_url() -> String {
    DEFAULT_IMAGE_MODEL_URL.to_string()
}

fn default_video_model() -> String {
    DEFAULT_VIDEO_MODEL.to_string()
}

fn default_queue_base_url() -> String {
    DEFAULT_QUEUE_BASE_URL.to_string()
}

fn default_generation_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"));

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Resolve the immutable fal.ai settings passed to each client.
    ///
    /// The FAL_API_KEY environment variable takes precedence over the
    /// config file; this is the only point where the environment is read.
    pub fn fal_config(&self) -> FalConfig {
        let api_key = std::env::var(FAL_API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.fal.api_key.clone())
            .filter(|k| !k.is_empty());

        FalConfig {
            api_key,
            image_model_url: self.fal.image_model_url.clone(),
            video_model: self.fal.video_model.clone(),
            queue_base_url: self.fal.queue_base_url.clone(),
            generation_timeout: Duration::from_secs(self.fal.generation_timeout_secs),
            poll_interval: Duration::from_millis(self.fal.poll_interval_ms),
        }
    }
}

/// Immutable fal.ai settings, resolved once at startup and handed to each
/// component at construction.
#[derive(Debug, Clone)]
pub struct FalConfig {
    /// API credential; absence fails each generation request, not startup.
    pub api_key: Option<String>,
    /// Synchronous text-to-image model URL.
    pub image_model_url: String,
    /// Image-to-video model identifier on the queue API.
    pub video_model: String,
    /// Base URL of the queue API.
    pub queue_base_url: String,
    /// Upper bound on one video generation, submit to completion.
    pub generation_timeout: Duration,
    /// Delay between status polls.
    pub poll_interval: Duration,
}

impl Default for FalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            image_model_url: default_image_model_url(),
            video_model: default_video_model(),
            queue_base_url: default_queue_base_url(),
            generation_timeout: Duration::from_secs(default_generation_timeout_secs()),
            poll_interval: Duration::from_millis(default_poll_interval_ms()),
        }
    }
}

impl FalConfig {
    /// Get the API key, or fail if none is configured.
    pub fn require_api_key(&self) -> Result<&str, FalError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FalError::MissingApiKey)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.output_dir, PathBuf::from("outputs"));
        assert_eq!(config.fal.image_model_url, DEFAULT_IMAGE_MODEL_URL);
        assert_eq!(config.fal.video_model, DEFAULT_VIDEO_MODEL);
        assert_eq!(config.fal.queue_base_url, DEFAULT_QUEUE_BASE_URL);
        assert!(config.fal.api_key.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let content = r#"
            [server]
            port = 8080
            output_dir = "videos"

            [fal]
            api_key = "file-key"
            image_model_url = "https://fal.run/fal-ai/other-model"
            video_model = "fal-ai/other/image-to-video"
            generation_timeout_secs = 60
            poll_interval_ms = 500
        "#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.output_dir, PathBuf::from("videos"));
        assert_eq!(config.fal.api_key, Some("file-key".to_string()));
        assert_eq!(config.fal.generation_timeout_secs, 60);
        assert_eq!(config.fal.poll_interval_ms, 500);
        // Unset fields keep defaults
        assert_eq!(config.server.public_dir, PathBuf::from("public"));
        assert_eq!(config.fal.queue_base_url, DEFAULT_QUEUE_BASE_URL);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.fal.generation_timeout_secs, 120);
        assert_eq!(config.fal.poll_interval_ms, 2000);
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let config = Config::load(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_invalid_file_returns_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let result = Config::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_require_api_key() {
        let config = FalConfig {
            api_key: Some("key".to_string()),
            ..FalConfig::default()
        };
        assert_eq!(config.require_api_key().unwrap(), "key");

        let config = FalConfig::default();
        assert!(matches!(
            config.require_api_key(),
            Err(FalError::MissingApiKey)
        ));

        let config = FalConfig {
            api_key: Some(String::new()),
            ..FalConfig::default()
        };
        assert!(matches!(
            config.require_api_key(),
            Err(FalError::MissingApiKey)
        ));
    }

    #[test]
    fn test_fal_config_env_var_overrides_file() {
        // Save current value
        let original = std::env::var(FAL_API_KEY_ENV).ok();

        let mut config = Config::default();
        config.fal.api_key = Some("file-key".to_string());

        std::env::set_var(FAL_API_KEY_ENV, "env-key");
        assert_eq!(config.fal_config().api_key, Some("env-key".to_string()));

        std::env::remove_var(FAL_API_KEY_ENV);
        assert_eq!(config.fal_config().api_key, Some("file-key".to_string()));

        // Restore original value
        if let Some(val) = original {
            std::env::set_var(FAL_API_KEY_ENV, val);
        }
    }
}
