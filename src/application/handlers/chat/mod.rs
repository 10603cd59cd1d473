//! Chat relay handlers.

mod poll_policy;
mod send_chat_message;

pub use poll_policy::{PollPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL};
pub use send_chat_message::{
    SendChatMessageCommand, SendChatMessageHandler, SendChatMessageResult,
};
