//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates the relay domain and coordinates between ports.

mod errors;
pub mod handlers;
mod session_registry;

pub use errors::{ErrorCode, RelayError};
pub use handlers::{
    PollPolicy, SendChatMessageCommand, SendChatMessageHandler, SendChatMessageResult,
};
pub use session_registry::SessionRegistry;
