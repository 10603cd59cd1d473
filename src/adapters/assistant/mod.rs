//! Assistant API Adapters.
//!
//! Implementations of the AssistantApi port.
//!
//! ## Available Adapters
//!
//! - `OpenAIAssistantsClient` - OpenAI Assistants API (threads, messages, runs)
//! - `MockAssistantApi` - Scripted mock for testing

mod mock_assistant;
mod openai_assistants;

pub use mock_assistant::{MockAssistantApi, MockCall, MockOperation};
pub use openai_assistants::{OpenAIAssistantsClient, OpenAIAssistantsConfig};
