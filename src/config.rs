//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for talking to the intake backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash.
    pub api_base_url: String,
    /// Per-request timeout applied by the HTTP transport.
    pub request_timeout: Duration,
    /// MIME type assumed for recorded audio when the source cannot tell.
    pub audio_mime: String,
    /// User id sent with one-shot generation requests.
    pub user_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            audio_mime: "audio/webm".to_string(),
            user_id: "local_user".to_string(),
        }
    }
}

impl ClientConfig {
    /// Build from environment variables.
    ///
    /// `FITNESS_API_URL` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = std::env::var("FITNESS_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("FITNESS_API_URL".to_string()))?;
        Self::default().with_env_overrides(api_base_url)
    }

    fn with_env_overrides(mut self, api_base_url: String) -> Result<Self, ConfigError> {
        let api_base_url = api_base_url.trim().trim_end_matches('/').to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                key: "FITNESS_API_URL".to_string(),
                message: format!("expected an http(s) URL, got {api_base_url:?}"),
            });
        }
        self.api_base_url = api_base_url;

        if let Ok(raw) = std::env::var("FITNESS_API_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "Ignoring invalid FITNESS_API_TIMEOUT_SECS"),
            }
        }

        if let Ok(mime) = std::env::var("FITNESS_AUDIO_MIME") {
            if mime.contains('/') {
                self.audio_mime = mime;
            } else {
                tracing::warn!(value = %mime, "Ignoring invalid FITNESS_AUDIO_MIME");
            }
        }

        if let Ok(user_id) = std::env::var("FITNESS_USER_ID") {
            if !user_id.trim().is_empty() {
                self.user_id = user_id.trim().to_string();
            }
        }

        Ok(self)
    }

    /// Join a path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
