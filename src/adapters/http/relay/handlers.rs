//! HTTP handlers for relay endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::{RelayError, SendChatMessageCommand, SendChatMessageHandler};
use crate::config::EnvReport;

use super::dto::{ChatRequest, ChatResponse, EnvResponse, ErrorResponse, HealthResponse};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Shared state for relay routes.
#[derive(Clone)]
pub struct RelayAppState {
    pub chat_handler: Arc<SendChatMessageHandler>,
    pub env: EnvReport,
}

impl RelayAppState {
    pub fn new(chat_handler: Arc<SendChatMessageHandler>, env: EnvReport) -> Self {
        Self { chat_handler, env }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET / - Liveness probe
pub async fn root() -> &'static str {
    "OK"
}

/// GET /health - Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// GET /env - Which settings are present
pub async fn env_check(State(state): State<RelayAppState>) -> Json<EnvResponse> {
    Json(EnvResponse::from(&state.env))
}

/// POST /chat - Relay a message to the assistant
pub async fn post_chat(
    State(state): State<RelayAppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(value)) => ChatRequest::from_value(&value),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable chat body");
            ChatRequest::default()
        }
    };

    let session = request.session_key();
    let span = tracing::info_span!(
        "chat",
        request_id = %Uuid::new_v4(),
        session = %session,
    );

    async move {
        tracing::debug!(
            text_len = request.text.as_ref().map(String::len),
            "POST /chat"
        );

        let cmd = SendChatMessageCommand {
            text: request.text,
            session,
        };

        match state.chat_handler.handle(cmd).await {
            Ok(result) => {
                let response = ChatResponse { text: result.text };
                (StatusCode::OK, Json(response)).into_response()
            }
            Err(e) => handle_relay_error(e),
        }
    }
    .instrument(span)
    .await
}

/// Maps a relay failure to its status and public message.
fn handle_relay_error(error: RelayError) -> Response {
    let status = if error.is_client_error() {
        tracing::warn!(code = %error.code(), error = %error, "Chat request rejected");
        StatusCode::BAD_REQUEST
    } else {
        tracing::error!(code = %error.code(), error = %error, "Chat request failed");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(ErrorResponse::new(error.public_message()))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::relay::RunStatus;
    use crate::ports::AssistantApiError;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_maps_to_400() {
        let response = handle_relay_error(RelayError::BadRequest("Missing text".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Missing text");
    }

    #[tokio::test]
    async fn run_failure_maps_to_500_with_status() {
        let response = handle_relay_error(RelayError::RunFailed(RunStatus::Cancelled));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Run cancelled");
    }

    #[tokio::test]
    async fn upstream_detail_is_not_exposed() {
        let response = handle_relay_error(RelayError::Upstream(
            AssistantApiError::InvalidRequest("No assistant found with id 'asst_x'".into()),
        ));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"], "Server error");
    }
}
