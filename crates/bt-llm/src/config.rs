//! Connection settings for the Messages API.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{LlmError, Result};

pub const DEFAULT_MODEL: &str = "claude-opus-4-1";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const BASE_URL_ENV: &str = "ANTHROPIC_BASE_URL";

/// Model, credentials and request limits.
///
/// `max_tokens` and `temperature` override the per-task defaults when set.
#[derive(Clone)]
pub struct AssistantConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_tokens: None,
            temperature: None,
        }
    }
}

// The key never appears in logs.
impl fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AssistantConfig {
    /// Defaults with the key and base URL taken from the environment.
    pub fn from_env() -> Self {
        let non_empty = |name: &str| env::var(name).ok().filter(|value| !value.trim().is_empty());
        let mut config = Self {
            api_key: non_empty(API_KEY_ENV),
            ..Self::default()
        };
        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        config
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(LlmError::MissingApiKey)
    }

    pub(crate) fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_key() {
        let config = AssistantConfig {
            api_key: Some("sk-secret".to_string()),
            ..AssistantConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn messages_url_tolerates_trailing_slash() {
        let config = AssistantConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..AssistantConfig::default()
        };
        assert_eq!(config.messages_url(), "http://localhost:8080/v1/messages");
    }

    #[test]
    fn missing_key_is_an_error() {
        assert!(matches!(
            AssistantConfig::default().require_api_key(),
            Err(LlmError::MissingApiKey)
        ));
    }
}
