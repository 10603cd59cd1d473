//! Assistant API Port - Interface for the hosted conversational assistant.
//!
//! The remote service owns threads, messages and runs. The relay only
//! holds their identifiers and drives them through this port, so the
//! HTTP client can be swapped for a scripted double in tests.
//!
//! # Example
//!
//! ```ignore
//! let thread = api.create_thread().await?;
//! api.create_message(&thread, MessageRole::User, "hello").await?;
//! let run = api.create_run(&thread, &assistant_id).await?;
//! let run = api.retrieve_run(&thread, &run.id).await?;
//! let latest = api.list_messages(&thread, MessageQuery::latest()).await?;
//! ```

use async_trait::async_trait;

use crate::domain::relay::{AssistantId, MessageRole, Run, RunId, ThreadId, ThreadMessage};

/// Port for the remote assistant service.
///
/// Every method is a single network round trip. Implementations must not
/// retry on their own; the caller decides what a failure means.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Creates a new, empty conversation thread.
    async fn create_thread(&self) -> Result<ThreadId, AssistantApiError>;

    /// Appends a message to the thread's message log.
    async fn create_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantApiError>;

    /// Starts a run of the given assistant against the thread.
    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
    ) -> Result<Run, AssistantApiError>;

    /// Fetches the current status of a run.
    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, AssistantApiError>;

    /// Lists thread messages.
    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        query: MessageQuery,
    ) -> Result<Vec<ThreadMessage>, AssistantApiError>;
}

/// Parameters for [`AssistantApi::list_messages`].
///
/// Messages are always listed newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    pub limit: u32,
}

impl MessageQuery {
    /// Wire value of the `order` parameter.
    pub const ORDER: &'static str = "desc";

    /// Only the newest message.
    pub fn latest() -> Self {
        Self { limit: 1 }
    }
}

/// Assistant service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssistantApiError {
    /// API key was rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Rate limited by the service.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Thread, run or assistant does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service reported a server-side failure.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request exceeded the client timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl AssistantApiError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_query_is_desc_limit_one() {
        let query = MessageQuery::latest();
        assert_eq!(query.order, ListOrder::Desc);
        assert_eq!(query.limit, 1);
        assert_eq!(query.order.as_str(), "desc");
    }

    #[test]
    fn error_messages_carry_detail() {
        let err = AssistantApiError::unavailable("Server error 503: overloaded");
        assert!(err.to_string().contains("503"));

        let err = AssistantApiError::Timeout { timeout_secs: 60 };
        assert_eq!(err.to_string(), "request timed out after 60s");
    }
}
