//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `AssistantApi` - Remote assistant service (threads, messages, runs)
//! - `SessionStore` - Session key to thread mapping

mod assistant_api;
mod session_store;

pub use assistant_api::{AssistantApi, AssistantApiError, MessageQuery};
pub use session_store::{SessionStore, SessionStoreError};
