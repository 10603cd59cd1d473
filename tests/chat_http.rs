//! End-to-end tests of the HTTP surface against the mock assistant.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::response::Response;
use axum::Router;
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use assistant_relay::adapters::assistant::{MockAssistantApi, MockOperation};
use assistant_relay::adapters::storage::InMemorySessionStore;
use assistant_relay::adapters::{app_router, RelayAppState};
use assistant_relay::application::{PollPolicy, SendChatMessageHandler, SessionRegistry};
use assistant_relay::config::AppConfig;
use assistant_relay::domain::relay::{
    AssistantId, ContentBlock, MessageRole, RunStatus, SessionKey, ThreadId, ThreadMessage,
};
use assistant_relay::ports::{AssistantApiError, SessionStore};

struct TestApp {
    router: Router,
    api: MockAssistantApi,
    store: InMemorySessionStore,
}

impl TestApp {
    fn new(api: MockAssistantApi) -> Self {
        let store = InMemorySessionStore::new();
        let shared = Arc::new(api.clone());
        let registry = Arc::new(SessionRegistry::new(Arc::new(store.clone()), shared.clone()));
        let handler = SendChatMessageHandler::new(
            shared,
            registry,
            AssistantId::new("asst_client").unwrap(),
            PollPolicy::new(Duration::from_millis(1), 20),
        );

        let config = AppConfig::from_vars(
            [
                ("OPENAI_API_KEY", "sk-test"),
                ("ASSISTANT_ID_CLIENT", "asst_client"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        )
        .unwrap();

        let state = RelayAppState::new(Arc::new(handler), config.env_report());
        Self {
            router: app_router(state, &config.server.cors_origins_list()),
            api,
            store,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn chat(&self, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn chat_round_trip_returns_reply_and_sends_user_message() {
    let app = TestApp::new(
        MockAssistantApi::new()
            .with_thread_ids(["thread_1"])
            .with_run_statuses([RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed])
            .with_latest_message(ThreadMessage::assistant_text("msg_9", "Hi! How can I help?")),
    );

    let (status, body) = app
        .chat(json!({"text": "hi there", "session_id": "visitor-1"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"text": "Hi! How can I help?"}));

    let calls = app.api.get_calls();
    let operations: Vec<_> = calls.iter().map(|c| c.operation).collect();
    assert_eq!(
        operations,
        vec![
            MockOperation::CreateThread,
            MockOperation::CreateMessage,
            MockOperation::CreateRun,
            MockOperation::RetrieveRun,
            MockOperation::RetrieveRun,
            MockOperation::RetrieveRun,
            MockOperation::ListMessages,
        ]
    );
    assert_eq!(calls[1].detail.as_deref(), Some("hi there"));
    assert_eq!(calls[2].detail.as_deref(), Some("asst_client"));
    assert_eq!(calls[6].detail.as_deref(), Some("order=desc&limit=1"));
}

#[tokio::test]
async fn non_text_reply_falls_back_to_done() {
    let image_reply = ThreadMessage::new(
        "msg_img",
        MessageRole::Assistant,
        vec![ContentBlock::ImageFile {
            file_id: "file_1".to_string(),
        }],
    );
    let app = TestApp::new(MockAssistantApi::new().with_latest_message(image_reply));

    let (status, body) = app.chat(json!({"text": "draw me something"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"text": "Done."}));
}

#[tokio::test]
async fn empty_thread_falls_back_to_done() {
    let app = TestApp::new(MockAssistantApi::new());

    let (status, body) = app.chat(json!({"text": "anyone there?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Done.");
}

#[tokio::test]
async fn missing_or_empty_text_is_400_without_remote_calls() {
    let app = TestApp::new(MockAssistantApi::new());

    for body in [
        json!({"session_id": "s1"}),
        json!({"text": "", "session_id": "s1"}),
        json!({"text": null}),
        json!({"text": 7}),
    ] {
        let (status, response) = app.chat(body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "Missing text"}));
    }

    assert_eq!(app.api.total_calls(), 0);
    assert_eq!(app.store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_run_is_500_naming_status() {
    let app = TestApp::new(
        MockAssistantApi::new().with_run_statuses([RunStatus::InProgress, RunStatus::Failed]),
    );

    let (status, body) = app.chat(json!({"text": "hi", "session_id": "s1"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("failed"));
    assert_eq!(app.api.call_count(MockOperation::ListMessages), 0);
}

#[tokio::test]
async fn expired_run_is_500() {
    let app = TestApp::new(MockAssistantApi::new().with_run_statuses([RunStatus::Expired]));

    let (status, body) = app.chat(json!({"text": "hi"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Run expired"}));
}

#[tokio::test]
async fn upstream_failure_is_generic_500_and_session_not_bound() {
    let app = TestApp::new(MockAssistantApi::new().with_failure(
        MockOperation::CreateThread,
        AssistantApiError::AuthenticationFailed,
    ));

    let (status, body) = app.chat(json!({"text": "hi", "session_id": "s1"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Server error"}));
    assert!(app
        .store
        .get(&SessionKey::named("s1"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn session_reuses_its_thread_across_requests() {
    let app = TestApp::new(MockAssistantApi::new().with_thread_ids(["thread_a", "thread_b"]));

    for text in ["first", "second", "third"] {
        let (status, _) = app.chat(json!({"text": text, "session_id": "s1"})).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = app.chat(json!({"text": "hello", "session_id": "s2"})).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(app.api.call_count(MockOperation::CreateThread), 2);
    assert_eq!(
        app.store.get(&SessionKey::named("s1")).await.unwrap(),
        Some(ThreadId::new("thread_a"))
    );
    assert_eq!(
        app.store.get(&SessionKey::named("s2")).await.unwrap(),
        Some(ThreadId::new("thread_b"))
    );

    let s1_messages = app
        .api
        .get_calls()
        .into_iter()
        .filter(|c| c.operation == MockOperation::CreateMessage)
        .filter(|c| c.thread_id == Some(ThreadId::new("thread_a")))
        .count();
    assert_eq!(s1_messages, 3);
}

#[tokio::test]
async fn requests_without_session_share_one_bucket() {
    let app = TestApp::new(MockAssistantApi::new().with_thread_ids(["thread_anon", "thread_empty"]));

    app.chat(json!({"text": "one"})).await;
    app.chat(json!({"text": "two"})).await;
    app.chat(json!({"text": "three", "session_id": ""})).await;

    assert_eq!(app.api.call_count(MockOperation::CreateThread), 2);
    assert_eq!(
        app.store.get(&SessionKey::Unnamed).await.unwrap(),
        Some(ThreadId::new("thread_anon"))
    );
    assert_eq!(
        app.store.get(&SessionKey::named("")).await.unwrap(),
        Some(ThreadId::new("thread_empty"))
    );
}

#[tokio::test]
async fn numeric_session_ids_get_their_own_threads() {
    let app = TestApp::new(MockAssistantApi::new().with_thread_ids([
        "thread_one",
        "thread_two",
        "thread_anon",
        "thread_str",
    ]));

    for body in [
        json!({"text": "a", "session_id": 1}),
        json!({"text": "b", "session_id": 2}),
        json!({"text": "c"}),
        json!({"text": "d", "session_id": 1}),
        json!({"text": "e", "session_id": "1"}),
    ] {
        let (status, _) = app.chat(body).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(app.api.call_count(MockOperation::CreateThread), 4);
    let message_threads: Vec<_> = app
        .api
        .get_calls()
        .into_iter()
        .filter(|c| c.operation == MockOperation::CreateMessage)
        .filter_map(|c| c.thread_id)
        .collect();
    assert_eq!(
        message_threads,
        vec![
            ThreadId::new("thread_one"),
            ThreadId::new("thread_two"),
            ThreadId::new("thread_anon"),
            ThreadId::new("thread_one"),
            ThreadId::new("thread_str"),
        ]
    );
    assert_eq!(
        app.store.get(&SessionKey::literal("2")).await.unwrap(),
        Some(ThreadId::new("thread_two"))
    );
}

#[tokio::test]
async fn concurrent_first_messages_share_a_thread() {
    let app = Arc::new(TestApp::new(
        MockAssistantApi::new().with_thread_delay(Duration::from_millis(20)),
    ));

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                app.chat(json!({"text": format!("msg {}", i), "session_id": "busy"}))
                    .await
                    .0
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(app.api.call_count(MockOperation::CreateThread), 1);
    assert_eq!(app.api.call_count(MockOperation::CreateMessage), 8);
}

#[tokio::test]
async fn probes_and_diagnostics() {
    let app = TestApp::new(MockAssistantApi::new());

    let root = app.send(get("/")).await;
    assert_eq!(root.status(), StatusCode::OK);
    let bytes = to_bytes(root.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");

    let health = app.send(get("/health")).await;
    assert_eq!(body_json(health).await, json!({"ok": true}));

    let env = app.send(get("/env")).await;
    assert_eq!(
        body_json(env).await,
        json!({
            "has_OPENAI_API_KEY": true,
            "has_ASSISTANT_ID_CLIENT": true,
            "PORT": "not set"
        })
    );

    assert_eq!(app.api.total_calls(), 0);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = TestApp::new(MockAssistantApi::new());

    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/chat")
                .header(header::ORIGIN, "https://shop.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = TestApp::new(MockAssistantApi::new());

    let response = app.send(get("/nope")).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
