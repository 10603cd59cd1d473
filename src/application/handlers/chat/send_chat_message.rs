//! SendChatMessage command handler.
//!
//! Relays one user message to the assistant and waits for its reply:
//! resolve the session's thread, append the message, start a run, poll the
//! run until it is terminal, then read the newest thread message.

use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::application::{RelayError, SessionRegistry};
use crate::domain::relay::{
    reply_text, AssistantId, MessageRole, RunId, RunStatus, SessionKey, ThreadId,
};
use crate::ports::{AssistantApi, MessageQuery};

use super::PollPolicy;

/// Command to relay a chat message.
#[derive(Debug, Clone)]
pub struct SendChatMessageCommand {
    /// The user's message. Missing or empty text is rejected.
    pub text: Option<String>,
    /// The caller's session.
    pub session: SessionKey,
}

impl SendChatMessageCommand {
    pub fn new(text: impl Into<String>, session: SessionKey) -> Self {
        Self {
            text: Some(text.into()),
            session,
        }
    }
}

/// Result of a relayed chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendChatMessageResult {
    /// Reply text for the caller.
    pub text: String,
    pub thread_id: ThreadId,
    pub run_id: RunId,
    /// Number of run status checks performed.
    pub status_checks: u32,
}

/// Handler for [`SendChatMessageCommand`].
pub struct SendChatMessageHandler {
    api: Arc<dyn AssistantApi>,
    registry: Arc<SessionRegistry>,
    assistant_id: AssistantId,
    policy: PollPolicy,
    shutdown: CancellationToken,
}

impl SendChatMessageHandler {
    pub fn new(
        api: Arc<dyn AssistantApi>,
        registry: Arc<SessionRegistry>,
        assistant_id: AssistantId,
        policy: PollPolicy,
    ) -> Self {
        Self {
            api,
            registry,
            assistant_id,
            policy,
            shutdown: CancellationToken::new(),
        }
    }

    /// Aborts in-flight polling when `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn handle(
        &self,
        cmd: SendChatMessageCommand,
    ) -> Result<SendChatMessageResult, RelayError> {
        let text = match cmd.text {
            Some(text) if !text.is_empty() => text,
            _ => return Err(RelayError::BadRequest("Missing text".to_string())),
        };

        let thread_id = self.registry.get_or_create(&cmd.session).await?;

        self.api
            .create_message(&thread_id, MessageRole::User, &text)
            .await?;

        let run = self.api.create_run(&thread_id, &self.assistant_id).await?;
        tracing::debug!(%thread_id, run_id = %run.id, status = %run.status, "Run started");

        let cancel = self.shutdown.child_token();
        let status_checks = self
            .wait_for_completion(&thread_id, &run.id, &cancel)
            .await?;

        let latest = self
            .api
            .list_messages(&thread_id, MessageQuery::latest())
            .await?;
        let text = reply_text(latest.first());

        tracing::info!(
            session = %cmd.session,
            %thread_id,
            run_id = %run.id,
            status_checks,
            "Relayed chat message"
        );

        Ok(SendChatMessageResult {
            text,
            thread_id,
            run_id: run.id,
            status_checks,
        })
    }

    /// Polls the run until it completes, returning the number of checks.
    async fn wait_for_completion(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
        cancel: &CancellationToken,
    ) -> Result<u32, RelayError> {
        let mut attempts = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(RelayError::Cancelled);
            }

            let run = self.api.retrieve_run(thread_id, run_id).await?;
            attempts += 1;
            tracing::debug!(%run_id, status = %run.status, attempt = attempts, "Polled run");

            match run.status {
                RunStatus::Completed => return Ok(attempts),
                status if status.is_failure() => {
                    tracing::warn!(%thread_id, %run_id, %status, "Run ended without completing");
                    return Err(RelayError::RunFailed(status));
                }
                _ => {}
            }

            if attempts >= self.policy.max_attempts {
                tracing::warn!(%thread_id, %run_id, attempts, "Gave up waiting for run");
                return Err(RelayError::Timeout { attempts });
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(RelayError::Cancelled),
                _ = sleep(self.policy.interval) => {}
            }
        }
    }
}
