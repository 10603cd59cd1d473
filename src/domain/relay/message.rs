//! Thread messages and reply extraction.

use serde::{Deserialize, Serialize};

/// Reply returned when the newest message does not start with text.
pub const FALLBACK_REPLY: &str = "Done.";

/// Author of a thread message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One block of message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text { value: String },
    ImageFile { file_id: String },
    ImageUrl { url: String },
    /// A block kind this crate does not interpret.
    Other { kind: String },
}

impl ContentBlock {
    pub fn text(value: impl Into<String>) -> Self {
        ContentBlock::Text {
            value: value.into(),
        }
    }

    /// Wire name of the block kind.
    pub fn kind(&self) -> &str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::ImageFile { .. } => "image_file",
            ContentBlock::ImageUrl { .. } => "image_url",
            ContentBlock::Other { kind } => kind,
        }
    }
}

/// A message in a remote thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl ThreadMessage {
    pub fn new(id: impl Into<String>, role: MessageRole, content: Vec<ContentBlock>) -> Self {
        Self {
            id: id.into(),
            role,
            content,
        }
    }

    /// Creates an assistant message with a single text block.
    pub fn assistant_text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, MessageRole::Assistant, vec![ContentBlock::text(text)])
    }
}

/// Extracts the reply for the caller from the newest thread message.
///
/// Only the first content block is inspected. If it is text its value is
/// returned as-is, otherwise (no message, no content, non-text block) the
/// reply is [`FALLBACK_REPLY`].
pub fn reply_text(latest: Option<&ThreadMessage>) -> String {
    match latest.and_then(|m| m.content.first()) {
        Some(ContentBlock::Text { value }) => value.clone(),
        _ => FALLBACK_REPLY.to_string(),
    }
}
