//! Assistant service configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::PollPolicy;
use crate::domain::relay::AssistantId;

/// Assistant service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// API key for the assistant service (`OPENAI_API_KEY`)
    pub openai_api_key: Option<Secret<String>>,

    /// Assistant to run for chat messages (`ASSISTANT_ID_CLIENT`)
    pub assistant_id_client: Option<String>,

    /// Base URL of the assistant API
    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub openai_timeout_secs: u64,

    /// `OpenAI-Beta` header value
    #[serde(default = "default_beta_header")]
    pub openai_beta_header: String,

    /// Delay between run status checks in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Run status checks before a request times out
    #[serde(default = "default_poll_attempts")]
    pub poll_max_attempts: u32,
}

impl AssistantConfig {
    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Check if an assistant id is configured
    pub fn has_assistant_id(&self) -> bool {
        self.assistant_id_client
            .as_ref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    /// Exposes the API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key.as_ref().map(|k| k.expose_secret().as_str())
    }

    /// The configured assistant id
    pub fn assistant_id(&self) -> Result<AssistantId, ValidationError> {
        self.assistant_id_client
            .as_deref()
            .and_then(|id| AssistantId::new(id).ok())
            .ok_or(ValidationError::MissingRequired("ASSISTANT_ID_CLIENT"))
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.openai_timeout_secs)
    }

    /// Polling policy for run status
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            self.poll_max_attempts,
        )
    }

    /// Validate assistant configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        self.assistant_id()?;

        if !(self.openai_base_url.starts_with("http://")
            || self.openai_base_url.starts_with("https://"))
        {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.openai_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::InvalidPollInterval);
        }
        if self.poll_max_attempts == 0 {
            return Err(ValidationError::InvalidPollAttempts);
        }
        Ok(())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            assistant_id_client: None,
            openai_base_url: default_base_url(),
            openai_timeout_secs: default_timeout(),
            openai_beta_header: default_beta_header(),
            poll_interval_ms: default_poll_interval(),
            poll_max_attempts: default_poll_attempts(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_beta_header() -> String {
    "assistants=v2".to_string()
}

fn default_poll_interval() -> u64 {
    700
}

fn default_poll_attempts() -> u32 {
    200
}
