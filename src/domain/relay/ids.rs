//! Identifier value objects.
//!
//! Thread, run and assistant identifiers are opaque strings issued by the
//! remote assistant service. Session keys are supplied by callers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Caller-supplied session identifier.
///
/// Requests that omit `session_id` (or send `null`) all share the
/// [`SessionKey::Unnamed`] bucket, which is distinct from every other key
/// (including the empty string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// A string session identifier, stored verbatim.
    Named(String),
    /// A non-string identifier such as `1` or `true`, keyed by its JSON
    /// text. Never equal to a `Named` key, so `1` and `"1"` stay apart.
    Literal(String),
    /// No session identifier was supplied.
    #[default]
    Unnamed,
}

impl SessionKey {
    /// Creates a named session key.
    pub fn named(id: impl Into<String>) -> Self {
        SessionKey::Named(id.into())
    }

    /// Creates a key for a non-string identifier from its JSON text.
    pub fn literal(json: impl Into<String>) -> Self {
        SessionKey::Literal(json.into())
    }

    /// Returns the raw identifier, if one was supplied.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SessionKey::Named(id) | SessionKey::Literal(id) => Some(id),
            SessionKey::Unnamed => None,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKey::Named(id) | SessionKey::Literal(id) => write!(f, "{}", id),
            SessionKey::Unnamed => write!(f, "<unnamed>"),
        }
    }
}

/// Remote conversation thread identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote run identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies which assistant configuration the remote service runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssistantId(String);

impl AssistantId {
    /// Creates an assistant id, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyField` if `id` is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("assistant_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssistantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
