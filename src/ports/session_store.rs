//! Session Store Port - Where session → thread assignments live.
//!
//! The store holds a reference to a remote thread, never the thread itself.
//! Dropping an entry does not delete anything on the remote service.

use async_trait::async_trait;

use crate::domain::relay::{SessionKey, ThreadId};

/// Errors raised by a session store backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Port for the session → thread mapping.
///
/// Assignment is one-shot: once a key has a thread, it keeps it for the
/// lifetime of the store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the thread assigned to `key`, if any.
    async fn get(&self, key: &SessionKey) -> Result<Option<ThreadId>, SessionStoreError>;

    /// Assigns `thread_id` to `key` unless it already has a thread.
    ///
    /// Returns the thread that is assigned after the call, which is the
    /// pre-existing one if the key was already taken.
    async fn insert_if_absent(
        &self,
        key: SessionKey,
        thread_id: ThreadId,
    ) -> Result<ThreadId, SessionStoreError>;

    /// Number of sessions with an assigned thread.
    async fn len(&self) -> Result<usize, SessionStoreError>;
}
