//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid host address: {0}")]
    InvalidHost(String),

    #[error("Invalid assistant API base URL")]
    InvalidBaseUrl,

    #[error("Invalid assistant API timeout")]
    InvalidTimeout,

    #[error("Poll interval must be greater than zero")]
    InvalidPollInterval,

    #[error("Poll attempts must be greater than zero")]
    InvalidPollAttempts,
}
