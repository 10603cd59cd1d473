//! Relay domain - value objects and rules for the session-bound chat relay.
//!
//! The relay does not own any state machine of its own. It observes the
//! run status reported by the remote assistant service and decides when
//! polling is finished, then turns the newest thread message into a reply.

mod errors;
mod ids;
mod message;
mod run;

pub use errors::ValidationError;
pub use ids::{AssistantId, RunId, SessionKey, ThreadId};
pub use message::{reply_text, ContentBlock, MessageRole, ThreadMessage, FALLBACK_REPLY};
pub use run::{Run, RunStatus};
