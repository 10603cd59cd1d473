//! In-Memory Session Store Adapter
//!
//! Keeps session → thread assignments for the lifetime of the process.
//! Nothing is persisted; a restart starts every session on a new thread.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::relay::{SessionKey, ThreadId};
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory session store
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    threads: Arc<RwLock<HashMap<SessionKey, ThreadId>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all assignments (useful for tests)
    pub async fn clear(&self) {
        self.threads.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &SessionKey) -> Result<Option<ThreadId>, SessionStoreError> {
        Ok(self.threads.read().await.get(key).cloned())
    }

    async fn insert_if_absent(
        &self,
        key: SessionKey,
        thread_id: ThreadId,
    ) -> Result<ThreadId, SessionStoreError> {
        let mut threads = self.threads.write().await;
        Ok(threads.entry(key).or_insert(thread_id).clone())
    }

    async fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.threads.read().await.len())
    }
}
