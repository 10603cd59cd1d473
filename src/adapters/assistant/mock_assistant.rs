//! Mock Assistant API for testing.
//!
//! Scripted implementation of the AssistantApi port so the relay can be
//! exercised without calling the real service.
//!
//! # Features
//!
//! - Scripted run status sequences
//! - Configurable newest message
//! - Error injection per operation
//! - Simulated latency on thread creation (for race testing)
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let api = MockAssistantApi::new()
//!     .with_thread_ids(["t1"])
//!     .with_run_statuses([RunStatus::Queued, RunStatus::InProgress, RunStatus::Completed])
//!     .with_latest_message(ThreadMessage::assistant_text("msg_1", "hi there"));
//!
//! assert_eq!(api.call_count(MockOperation::RetrieveRun), 3);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::relay::{AssistantId, MessageRole, Run, RunId, RunStatus, ThreadId, ThreadMessage};
use crate::ports::{AssistantApi, AssistantApiError, MessageQuery};

/// Operations of the assistant port, for call counting and error injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    CreateThread,
    CreateMessage,
    CreateRun,
    RetrieveRun,
    ListMessages,
}

/// A recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub operation: MockOperation,
    pub thread_id: Option<ThreadId>,
    /// Message content, assistant id, run id or query, depending on the call.
    pub detail: Option<String>,
}

/// Mock assistant service.
#[derive(Debug, Clone)]
pub struct MockAssistantApi {
    /// Thread ids handed out by `create_thread` (generated once exhausted).
    thread_ids: Arc<Mutex<VecDeque<String>>>,
    /// Statuses returned by `retrieve_run`; the last one repeats forever.
    run_statuses: Arc<Mutex<VecDeque<RunStatus>>>,
    /// Message returned by `list_messages`.
    latest: Arc<Mutex<Option<ThreadMessage>>>,
    /// Operations that fail with the given error.
    failures: Arc<Mutex<HashMap<MockOperation, AssistantApiError>>>,
    /// Simulated latency for `create_thread`.
    thread_delay: Duration,
    counter: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl Default for MockAssistantApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssistantApi {
    /// Creates a mock whose runs complete on the first poll with no reply text.
    pub fn new() -> Self {
        Self {
            thread_ids: Arc::new(Mutex::new(VecDeque::new())),
            run_statuses: Arc::new(Mutex::new(VecDeque::new())),
            latest: Arc::new(Mutex::new(None)),
            failures: Arc::new(Mutex::new(HashMap::new())),
            thread_delay: Duration::ZERO,
            counter: Arc::new(AtomicUsize::new(0)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues thread ids for successive `create_thread` calls.
    pub fn with_thread_ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.thread_ids
            .lock()
            .unwrap()
            .extend(ids.into_iter().map(Into::into));
        self
    }

    /// Scripts the statuses returned by successive `retrieve_run` calls.
    pub fn with_run_statuses(self, statuses: impl IntoIterator<Item = RunStatus>) -> Self {
        self.run_statuses.lock().unwrap().extend(statuses);
        self
    }

    /// Sets the newest message of every thread.
    pub fn with_latest_message(self, message: ThreadMessage) -> Self {
        *self.latest.lock().unwrap() = Some(message);
        self
    }

    /// Makes every call to `operation` fail with `error`.
    pub fn with_failure(self, operation: MockOperation, error: AssistantApiError) -> Self {
        self.failures.lock().unwrap().insert(operation, error);
        self
    }

    /// Sets simulated latency for thread creation.
    pub fn with_thread_delay(mut self, delay: Duration) -> Self {
        self.thread_delay = delay;
        self
    }

    /// Returns the number of calls made for `operation`.
    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Returns the total number of calls made.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: MockOperation, thread_id: Option<&ThreadId>, detail: Option<String>) {
        self.calls.lock().unwrap().push(MockCall {
            operation,
            thread_id: thread_id.cloned(),
            detail,
        });
    }

    fn injected_failure(&self, operation: MockOperation) -> Result<(), AssistantApiError> {
        match self.failures.lock().unwrap().get(&operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn next_status(&self) -> RunStatus {
        let mut statuses = self.run_statuses.lock().unwrap();
        if statuses.len() > 1 {
            statuses.pop_front().unwrap_or(RunStatus::Completed)
        } else {
            statuses.front().copied().unwrap_or(RunStatus::Completed)
        }
    }
}

#[async_trait]
impl AssistantApi for MockAssistantApi {
    async fn create_thread(&self) -> Result<ThreadId, AssistantApiError> {
        self.record(MockOperation::CreateThread, None, None);

        if !self.thread_delay.is_zero() {
            sleep(self.thread_delay).await;
        }
        self.injected_failure(MockOperation::CreateThread)?;

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = self
            .thread_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("thread_mock_{}", n));
        Ok(ThreadId::new(id))
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        _role: MessageRole,
        content: &str,
    ) -> Result<(), AssistantApiError> {
        self.record(
            MockOperation::CreateMessage,
            Some(thread_id),
            Some(content.to_string()),
        );
        self.injected_failure(MockOperation::CreateMessage)
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
    ) -> Result<Run, AssistantApiError> {
        self.record(
            MockOperation::CreateRun,
            Some(thread_id),
            Some(assistant_id.to_string()),
        );
        self.injected_failure(MockOperation::CreateRun)?;

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(Run::new(RunId::new(format!("run_mock_{}", n)), RunStatus::Queued))
    }

    async fn retrieve_run(
        &self,
        thread_id: &ThreadId,
        run_id: &RunId,
    ) -> Result<Run, AssistantApiError> {
        self.record(
            MockOperation::RetrieveRun,
            Some(thread_id),
            Some(run_id.to_string()),
        );
        self.injected_failure(MockOperation::RetrieveRun)?;

        Ok(Run::new(run_id.clone(), self.next_status()))
    }

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        query: MessageQuery,
    ) -> Result<Vec<ThreadMessage>, AssistantApiError> {
        self.record(
            MockOperation::ListMessages,
            Some(thread_id),
            Some(format!("order={}&limit={}", MessageQuery::ORDER, query.limit)),
        );
        self.injected_failure(MockOperation::ListMessages)?;

        Ok(self.latest.lock().unwrap().iter().cloned().collect())
    }
}
