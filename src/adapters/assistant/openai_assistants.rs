//! OpenAI Assistants client - Implementation of AssistantApi over HTTP.
//!
//! Talks to the threads / messages / runs endpoints of the Assistants API
//! (v2). Each port method is exactly one HTTP request; retries and polling
//! belong to the caller.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIAssistantsConfig::new(api_key)
//!     .with_base_url("https://api.openai.com/v1")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let client = OpenAIAssistantsClient::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::relay::{
    AssistantId, ContentBlock, MessageRole, Run, RunId, RunStatus, ThreadId, ThreadMessage,
};
use crate::ports::{AssistantApi, AssistantApiError, MessageQuery};

/// Configuration for the Assistants client.
#[derive(Debug, Clone)]
pub struct OpenAIAssistantsConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Value of the `OpenAI-Beta` header.
    pub beta_header: String,
}

impl OpenAIAssistantsConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            beta_header: "assistants=v2".to_string(),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `OpenAI-Beta` header value.
    pub fn with_beta_header(mut self, value: impl Into<String>) -> Self {
        self.beta_header = value.into();
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// HTTP client for the Assistants API.
pub struct OpenAIAssistantsClient {
    config: OpenAIAssistantsConfig,
    client: Client,
}

impl OpenAIAssistantsClient {
    /// Creates a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `AssistantApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: OpenAIAssistantsConfig) -> Result<Self, AssistantApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AssistantApiError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Adds auth headers, sends, checks status and decodes the body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AssistantApiError> {
        let response = request
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("OpenAI-Beta", self.config.beta_header.as_str())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AssistantApiError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    AssistantApiError::network(format!("Connection failed: {}", e))
                } else {
                    AssistantApiError::network(e.to_string())
                }
            })?;

        let response = Self::handle_response_status(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| AssistantApiError::parse(format!("Failed to parse response: {}", e)))
    }

    /// Maps non-success statuses onto port errors.
    async fn handle_response_status(response: Response) -> Result<Response, AssistantApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        let message = Self::error_message(&error_body);

        match status.as_u16() {
            401 | 403 => Err(AssistantApiError::AuthenticationFailed),
            404 => Err(AssistantApiError::NotFound(message)),
            429 => Err(AssistantApiError::RateLimited(message)),
            400 | 422 => Err(AssistantApiError::InvalidRequest(message)),
            500..=599 => Err(AssistantApiError::unavailable(format!(
                "Server error {}: {}",
                status, message
            ))),
            _ => Err(AssistantApiError::network(format!(
                "Unexpected status {}: {}",
                status, message
            ))),
        }
    }

    /// Pulls `error.message` out of an API error body, or returns the body.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string())
    }
}

#[async_trait]
impl AssistantApi for OpenAIAssistantsClient {
    async fn create_thread(&self) -> Result<ThreadId, AssistantApiError> {
        let thread: ThreadObject = self
            .send(self.client.post(self.url("threads")).json(&serde_json::json!({})))
            .await?;

        tracing::debug!(thread_id = %thread.id, "Created assistant thread");
        Ok(ThreadId::new(thread.id))
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantApiError> {
        let body = CreateMessageRequest {
            role: role.as_str(),
            content,
        };
        let _: IgnoredAny = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{}/messages", thread_id)))
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
    ) -> Result<Run, AssistantApiError> {
        let body = CreateRunRequest {
            assistant_id: assistant_id.as_str(),
        };
        let run: RunObject = self
            .send(
                self.client
                    .post(self.url(&format!("threads/{}/runs", thread_id)))
                    .json(&body),
            )
            .await?;

        tracing::debug!(%thread_id, run_id = %run.id, status = %run.status, "Created run");
        Ok(run.into())
    }

    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, AssistantApiError> {
        let run: RunObject = self
            .send(
                self.client
                    .get(self.url(&format!("threads/{}/runs/{}", thread_id, run_id))),
            )
            .await?;
        Ok(run.into())
    }

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        query: MessageQuery,
    ) -> Result<Vec<ThreadMessage>, AssistantApiError> {
        let list: MessageList = self
            .send(
                self.client
                    .get(self.url(&format!("threads/{}/messages", thread_id)))
                    .query(&[
                        ("order", MessageQuery::ORDER.to_string()),
                        ("limit", query.limit.to_string()),
                    ]),
            )
            .await?;

        Ok(list.data.into_iter().map(Into::into).collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Wire types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: RunStatus,
}

impl From<RunObject> for Run {
    fn from(run: RunObject) -> Self {
        Run::new(RunId::new(run.id), run.status)
    }
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    id: String,
    role: MessageRole,
    #[serde(default)]
    content: Vec<serde_json::Value>,
}

impl From<MessageObject> for ThreadMessage {
    fn from(message: MessageObject) -> Self {
        ThreadMessage::new(
            message.id,
            message.role,
            message.content.iter().map(content_block).collect(),
        )
    }
}

/// Decodes a content block, keeping unknown kinds instead of failing.
fn content_block(value: &serde_json::Value) -> ContentBlock {
    let kind = value.get("type").and_then(|t| t.as_str()).unwrap_or("");
    let field = |outer: &str, inner: &str| {
        value
            .get(outer)
            .and_then(|o| o.get(inner))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    match kind {
        "text" => match field("text", "value") {
            Some(value) => ContentBlock::Text { value },
            None => ContentBlock::Other {
                kind: kind.to_string(),
            },
        },
        "image_file" => ContentBlock::ImageFile {
            file_id: field("image_file", "file_id").unwrap_or_default(),
        },
        "image_url" => ContentBlock::ImageUrl {
            url: field("image_url", "url").unwrap_or_default(),
        },
        other => ContentBlock::Other {
            kind: other.to_string(),
        },
    }
}
