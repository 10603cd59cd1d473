//! assistant-relay: HTTP relay between a website chat widget and a hosted
//! assistant.
//!
//! Loads configuration from the environment, wires the assistant client and
//! session store into the relay, and serves until SIGINT/SIGTERM.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use assistant_relay::adapters::{
    app_router, InMemorySessionStore, OpenAIAssistantsClient, OpenAIAssistantsConfig,
    RelayAppState,
};
use assistant_relay::application::{SendChatMessageHandler, SessionRegistry};
use assistant_relay::config::{AppConfig, LogFormat, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    let assistant = &config.assistant;
    let api_key = assistant.api_key().unwrap_or_default();
    let client = OpenAIAssistantsClient::new(
        OpenAIAssistantsConfig::new(api_key)
            .with_base_url(assistant.openai_base_url.as_str())
            .with_timeout(assistant.timeout())
            .with_beta_header(assistant.openai_beta_header.as_str()),
    )?;
    let api = Arc::new(client);

    let store = Arc::new(InMemorySessionStore::new());
    let registry = Arc::new(SessionRegistry::new(store, api.clone()));

    let shutdown = CancellationToken::new();
    let chat_handler = SendChatMessageHandler::new(
        api,
        registry,
        assistant.assistant_id()?,
        assistant.poll_policy(),
    )
    .with_shutdown(shutdown.clone());

    let state = RelayAppState::new(Arc::new(chat_handler), config.env_report());
    let app = app_router(state, &config.server.cors_origins_list());

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        poll_interval_ms = assistant.poll_interval_ms,
        poll_max_attempts = assistant.poll_max_attempts,
        poll_budget_ms = assistant.poll_policy().max_wait().as_millis() as u64,
        "assistant-relay listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("assistant-relay stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| server.log_level.as_str().into());

    match server.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Resolves on SIGINT or SIGTERM, cancelling in-flight relay calls first.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    token.cancel();
}
