//! Application handlers.
//!
//! Command handlers that orchestrate the relay through its ports.

pub mod chat;

pub use chat::{
    PollPolicy, SendChatMessageCommand, SendChatMessageHandler, SendChatMessageResult,
};
