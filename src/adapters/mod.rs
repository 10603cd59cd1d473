//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `assistant` - Assistant service clients (OpenAI Assistants, mock)
//! - `storage` - Session store implementations
//! - `http` - axum router exposing the relay

pub mod assistant;
pub mod http;
pub mod storage;

pub use assistant::{MockAssistantApi, OpenAIAssistantsClient, OpenAIAssistantsConfig};
pub use http::{app_router, RelayAppState};
pub use storage::InMemorySessionStore;
