//! AI provider configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI backend configuration (Anthropic).
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the backend.
    pub api_key: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. Expiry is treated as a detector or
    /// extraction failure, never a hard turn failure.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get the timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate AI configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("HAVEN__AI__API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::Invalid {
                field: "ai.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

pub(super) fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_timeout() -> u64 {
    60
}
