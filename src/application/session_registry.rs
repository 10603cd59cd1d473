//! Session registry - resolves a session key to its remote thread.
//!
//! Threads are created lazily on the first message for a key. Concurrent
//! first requests for the same key are serialised on a per-key lock so they
//! converge on one remote thread; requests for different keys never wait on
//! each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;

use crate::domain::relay::{SessionKey, ThreadId};
use crate::ports::{AssistantApi, SessionStore};

use super::RelayError;

/// Get-or-create front for the session store.
pub struct SessionRegistry {
    store: Arc<dyn SessionStore>,
    api: Arc<dyn AssistantApi>,
    creating: StdMutex<KeyLocks>,
}

type KeyLocks = HashMap<SessionKey, Arc<Mutex<()>>>;

impl SessionRegistry {
    pub fn new(store: Arc<dyn SessionStore>, api: Arc<dyn AssistantApi>) -> Self {
        Self {
            store,
            api,
            creating: StdMutex::new(HashMap::new()),
        }
    }

    /// Returns the thread for `key`, creating one on first use.
    ///
    /// A remote call is made only when the key has no thread yet. Failures
    /// propagate unchanged and leave the key unassigned.
    pub async fn get_or_create(&self, key: &SessionKey) -> Result<ThreadId, RelayError> {
        if let Some(thread_id) = self.store.get(key).await? {
            return Ok(thread_id);
        }

        let slot = KeyLock::acquire(&self.creating, key);
        let _guard = slot.lock.lock().await;
        self.create_if_missing(key).await
    }

    /// Number of sessions with an assigned thread.
    pub async fn session_count(&self) -> Result<usize, RelayError> {
        Ok(self.store.len().await?)
    }

    async fn create_if_missing(&self, key: &SessionKey) -> Result<ThreadId, RelayError> {
        // Another request may have finished creating while we waited.
        if let Some(thread_id) = self.store.get(key).await? {
            return Ok(thread_id);
        }

        let created = self.api.create_thread().await?;
        let assigned = self
            .store
            .insert_if_absent(key.clone(), created.clone())
            .await?;

        if assigned != created {
            tracing::warn!(
                session = %key,
                orphaned_thread = %created,
                thread_id = %assigned,
                "Session already had a thread; discarding the new one"
            );
        } else {
            tracing::info!(session = %key, thread_id = %assigned, "Created thread for session");
        }

        Ok(assigned)
    }

    #[cfg(test)]
    fn pending_locks(&self) -> usize {
        lock_map(&self.creating).len()
    }
}

/// A handle on one key's creation lock.
///
/// Dropping it removes the map entry once no other request holds the same
/// lock, including when the owning future is dropped mid-creation.
struct KeyLock<'a> {
    creating: &'a StdMutex<KeyLocks>,
    key: SessionKey,
    lock: Arc<Mutex<()>>,
}

impl<'a> KeyLock<'a> {
    fn acquire(creating: &'a StdMutex<KeyLocks>, key: &SessionKey) -> Self {
        let lock = lock_map(creating)
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        Self {
            creating,
            key: key.clone(),
            lock,
        }
    }
}

impl Drop for KeyLock<'_> {
    fn drop(&mut self) {
        let mut creating = lock_map(self.creating);
        // One reference in the map plus ours means nobody else is waiting.
        let idle = creating.get(&self.key).is_some_and(|held| {
            Arc::ptr_eq(held, &self.lock) && Arc::strong_count(held) == 2
        });
        if idle {
            creating.remove(&self.key);
        }
    }
}

/// The map is never held across an await, so a poisoned lock still holds
/// consistent data.
fn lock_map(creating: &StdMutex<KeyLocks>) -> std::sync::MutexGuard<'_, KeyLocks> {
    creating.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::assistant::{MockAssistantApi, MockOperation};
    use crate::adapters::storage::InMemorySessionStore;
    use crate::ports::AssistantApiError;
    use std::time::Duration;

    fn registry(api: MockAssistantApi) -> (Arc<SessionRegistry>, InMemorySessionStore) {
        let store = InMemorySessionStore::new();
        let registry = SessionRegistry::new(Arc::new(store.clone()), Arc::new(api));
        (Arc::new(registry), store)
    }

    #[tokio::test]
    async fn first_use_creates_thread() {
        let api = MockAssistantApi::new().with_thread_ids(["t1"]);
        let (registry, _) = registry(api.clone());

        let thread = registry.get_or_create(&SessionKey::named("s1")).await.unwrap();

        assert_eq!(thread, ThreadId::new("t1"));
        assert_eq!(api.call_count(MockOperation::CreateThread), 1);
    }

    #[tokio::test]
    async fn known_session_reuses_thread() {
        let api = MockAssistantApi::new().with_thread_ids(["t1", "t2"]);
        let (registry, _) = registry(api.clone());
        let key = SessionKey::named("s1");

        let first = registry.get_or_create(&key).await.unwrap();
        let second = registry.get_or_create(&key).await.unwrap();
        let third = registry.get_or_create(&key).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(api.call_count(MockOperation::CreateThread), 1);
    }

    #[tokio::test]
    async fn distinct_sessions_get_distinct_threads() {
        let api = MockAssistantApi::new().with_thread_ids(["t1", "t2", "t3"]);
        let (registry, _) = registry(api.clone());

        let a = registry.get_or_create(&SessionKey::named("a")).await.unwrap();
        let b = registry.get_or_create(&SessionKey::named("b")).await.unwrap();
        let anon = registry.get_or_create(&SessionKey::Unnamed).await.unwrap();

        assert_ne!(a, b);
        assert_ne!(b, anon);
        assert_eq!(registry.session_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn concurrent_first_requests_share_one_thread() {
        let api = MockAssistantApi::new().with_thread_delay(Duration::from_millis(20));
        let (registry, _) = registry(api.clone());
        let key = SessionKey::named("racy");

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let registry = registry.clone();
                let key = key.clone();
                tokio::spawn(async move { registry.get_or_create(&key).await.unwrap() })
            })
            .collect();

        let mut threads = Vec::new();
        for task in tasks {
            threads.push(task.await.unwrap());
        }

        assert!(threads.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(api.call_count(MockOperation::CreateThread), 1);
        assert_eq!(registry.pending_locks(), 0);
    }

    #[tokio::test]
    async fn creation_failure_propagates_and_leaves_key_unassigned() {
        let api = MockAssistantApi::new().with_failure(
            MockOperation::CreateThread,
            AssistantApiError::unavailable("Server error 503"),
        );
        let (registry, store) = registry(api.clone());
        let key = SessionKey::named("s1");

        let err = registry.get_or_create(&key).await.unwrap_err();

        assert!(matches!(err, RelayError::Upstream(AssistantApiError::Unavailable(_))));
        assert!(store.get(&key).await.unwrap().is_none());
        assert_eq!(registry.pending_locks(), 0);
    }

    #[tokio::test]
    async fn abandoned_creation_releases_key_lock() {
        let api = MockAssistantApi::new()
            .with_thread_ids(["t1"])
            .with_thread_delay(Duration::from_millis(200));
        let (registry, store) = registry(api.clone());
        let key = SessionKey::named("gone");

        let task = {
            let registry = registry.clone();
            let key = key.clone();
            tokio::spawn(async move { registry.get_or_create(&key).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(registry.pending_locks(), 1);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert_eq!(registry.pending_locks(), 0);
        assert!(store.get(&key).await.unwrap().is_none());
        assert_eq!(api.call_count(MockOperation::CreateThread), 1);
    }

    #[tokio::test]
    async fn preassigned_thread_is_used_without_remote_call() {
        let api = MockAssistantApi::new();
        let (registry, store) = registry(api.clone());
        store
            .insert_if_absent(SessionKey::named("s1"), ThreadId::new("existing"))
            .await
            .unwrap();

        let thread = registry.get_or_create(&SessionKey::named("s1")).await.unwrap();

        assert_eq!(thread, ThreadId::new("existing"));
        assert_eq!(api.total_calls(), 0);
    }
}
