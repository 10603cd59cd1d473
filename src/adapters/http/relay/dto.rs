//! HTTP DTOs for relay endpoints.

use serde::Serialize;
use serde_json::Value;

use crate::config::EnvReport;
use crate::domain::relay::SessionKey;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /chat`.
///
/// Read field by field so that a wrongly typed field only loses that field:
/// a non-string `text` counts as missing rather than rejecting the request.
/// Any `session_id` other than `null` names a session, whatever its type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatRequest {
    pub text: Option<String>,
    pub session: SessionKey,
}

impl ChatRequest {
    pub fn from_value(value: &Value) -> Self {
        let text = value.get("text").and_then(Value::as_str).map(str::to_owned);
        let session = match value.get("session_id") {
            None | Some(Value::Null) => SessionKey::Unnamed,
            Some(Value::String(id)) => SessionKey::named(id.as_str()),
            Some(other) => SessionKey::literal(other.to_string()),
        };
        Self { text, session }
    }

    pub fn session_key(&self) -> SessionKey {
        self.session.clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Reply to `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// `GET /env` body.
#[derive(Debug, Clone, Serialize)]
pub struct EnvResponse {
    #[serde(rename = "has_OPENAI_API_KEY")]
    pub has_openai_api_key: bool,
    #[serde(rename = "has_ASSISTANT_ID_CLIENT")]
    pub has_assistant_id_client: bool,
    #[serde(rename = "PORT")]
    pub port: String,
}

impl From<&EnvReport> for EnvResponse {
    fn from(report: &EnvReport) -> Self {
        Self {
            has_openai_api_key: report.has_api_key,
            has_assistant_id_client: report.has_assistant_id,
            port: report.port.clone().unwrap_or_else(|| "not set".to_string()),
        }
    }
}

/// Error body, always `{"error": message}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_reads_string_fields() {
        let req = ChatRequest::from_value(&json!({"text": "hi", "session_id": "abc"}));
        assert_eq!(req.text.as_deref(), Some("hi"));
        assert_eq!(req.session_key(), SessionKey::named("abc"));
    }

    #[test]
    fn chat_request_ignores_non_string_text_and_null_session() {
        let req = ChatRequest::from_value(&json!({"text": 42, "session_id": null}));
        assert_eq!(req, ChatRequest::default());
        assert_eq!(req.session_key(), SessionKey::Unnamed);
    }

    #[test]
    fn non_string_session_ids_are_named_by_json_text() {
        let cases = [
            (json!(1), "1"),
            (json!(2.5), "2.5"),
            (json!(true), "true"),
            (json!([1, 2]), "[1,2]"),
        ];
        for (id, text) in cases {
            let req = ChatRequest::from_value(&json!({"text": "hi", "session_id": id}));
            assert_eq!(req.session_key(), SessionKey::literal(text));
        }

        let numeric = ChatRequest::from_value(&json!({"session_id": 1}));
        let string = ChatRequest::from_value(&json!({"session_id": "1"}));
        assert_ne!(numeric.session_key(), string.session_key());
    }

    #[test]
    fn chat_request_from_non_object() {
        assert_eq!(ChatRequest::from_value(&json!("hi")), ChatRequest::default());
    }

    #[test]
    fn env_response_uses_wire_names() {
        let report = EnvReport {
            has_api_key: true,
            has_assistant_id: false,
            port: None,
        };
        let body = serde_json::to_value(EnvResponse::from(&report)).unwrap();
        assert_eq!(
            body,
            json!({
                "has_OPENAI_API_KEY": true,
                "has_ASSISTANT_ID_CLIENT": false,
                "PORT": "not set"
            })
        );
    }
}
