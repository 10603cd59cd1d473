//! Error taxonomy for the chat relay.

use std::fmt;
use thiserror::Error;

use crate::domain::relay::RunStatus;
use crate::ports::{AssistantApiError, SessionStoreError};

/// Error codes, one per failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadRequest,
    UpstreamError,
    RunFailed,
    Timeout,
    Cancelled,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::RunFailed => "RUN_FAILED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Errors that abort a chat request.
///
/// No variant is recovered from locally; each one ends the request.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    /// The caller's request is unusable (missing or empty text).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A call to the assistant service failed.
    #[error("Upstream error: {0}")]
    Upstream(#[from] AssistantApiError),

    /// The run reached a terminal status other than `completed`.
    #[error("Run {0}")]
    RunFailed(RunStatus),

    /// The run did not reach a terminal status within the poll budget.
    #[error("Run did not finish after {attempts} status checks")]
    Timeout { attempts: u32 },

    /// The process is shutting down.
    #[error("Request cancelled")]
    Cancelled,

    /// The session store failed.
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),
}

impl RelayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::BadRequest(_) => ErrorCode::BadRequest,
            RelayError::Upstream(_) => ErrorCode::UpstreamError,
            RelayError::RunFailed(_) => ErrorCode::RunFailed,
            RelayError::Timeout { .. } => ErrorCode::Timeout,
            RelayError::Cancelled => ErrorCode::Cancelled,
            RelayError::Store(_) => ErrorCode::InternalError,
        }
    }

    /// True if the caller caused the failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::BadRequest(_))
    }

    /// Message safe to show the caller. Details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            RelayError::BadRequest(msg) => msg.clone(),
            RelayError::RunFailed(status) => format!("Run {}", status),
            RelayError::Timeout { .. } => "Run timed out".to_string(),
            RelayError::Upstream(_)
            | RelayError::Cancelled
            | RelayError::Store(_) => "Server error".to_string(),
        }
    }
}
