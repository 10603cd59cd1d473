//! Application configuration module
//!
//! Configuration is read from a fixed set of unprefixed environment variables
//! (see [`KNOWN_VARS`]) using the `config` and `dotenvy` crates. A `.env` file
//! is honoured in development. Unknown variables in the environment are never
//! read.
//!
//! # Example
//!
//! ```no_run
//! use assistant_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on port {}", config.server.port());
//! ```

mod assistant;
mod error;
mod server;

pub use assistant::AssistantConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{LogFormat, ServerConfig, DEFAULT_PORT};

use std::collections::HashMap;

/// Environment variables the relay reads.
pub const KNOWN_VARS: &[&str] = &[
    "HOST",
    "PORT",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "CORS_ORIGINS",
    "OPENAI_API_KEY",
    "ASSISTANT_ID_CLIENT",
    "OPENAI_BASE_URL",
    "OPENAI_TIMEOUT_SECS",
    "OPENAI_BETA_HEADER",
    "POLL_INTERVAL_MS",
    "POLL_MAX_ATTEMPTS",
];

/// Root application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Listener, logging and CORS settings
    pub server: ServerConfig,

    /// Assistant API credentials and polling settings
    pub assistant: AssistantConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// Loads `.env` if present, then reads [`KNOWN_VARS`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let vars = KNOWN_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_string(), value)))
            .collect();

        Self::from_vars(vars)
    }

    /// Build configuration from an explicit variable map
    ///
    /// Empty values are treated as unset.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let source = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .source(Some(vars))
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?;

        let server = source.clone().try_deserialize::<ServerConfig>()?;
        let assistant = source.try_deserialize::<AssistantConfig>()?;

        Ok(Self { server, assistant })
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` naming the first missing or invalid setting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.assistant.validate()?;
        Ok(())
    }

    /// Configuration presence summary, safe to expose.
    pub fn env_report(&self) -> EnvReport {
        EnvReport {
            has_api_key: self.assistant.has_api_key(),
            has_assistant_id: self.assistant.has_assistant_id(),
            port: self.server.port.map(|p| p.to_string()),
        }
    }
}

/// Which settings are present, without their values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvReport {
    pub has_api_key: bool,
    pub has_assistant_id: bool,
    pub port: Option<String>,
}
