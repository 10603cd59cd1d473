//! Route configuration for relay endpoints.

use axum::routing::{get, post};
use axum::Router;
use http::HeaderValue;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{env_check, health, post_chat, root, RelayAppState};

/// Creates the relay router.
///
/// Routes:
/// - `GET /` - Plain-text liveness probe
/// - `GET /health` - `{"ok": true}`
/// - `GET /env` - Presence of required settings
/// - `POST /chat` - Relay a message to the assistant
pub fn relay_router() -> Router<RelayAppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/env", get(env_check))
        .route("/chat", post(post_chat))
}

/// Full application: relay routes with tracing and CORS layers applied.
///
/// An empty `cors_origins` allows any origin.
pub fn app_router(state: RelayAppState, cors_origins: &[String]) -> Router {
    relay_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(cors_origins)),
    )
}

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
