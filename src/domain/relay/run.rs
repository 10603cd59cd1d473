//! Assistant runs and their externally-owned status.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::RunId;

/// Status of a run as reported by the remote service.
///
/// Only `completed`, `failed`, `cancelled` and `expired` end polling.
/// Every other value, including ones this crate does not know about, keeps
/// the relay polling until its attempt budget runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Returns true once no further status change can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }

    /// Returns true for terminal statuses other than `completed`.
    pub fn is_failure(&self) -> bool {
        self.is_terminal() && *self != RunStatus::Completed
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single execution of the assistant against a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub id: RunId,
    pub status: RunStatus,
}

impl Run {
    pub fn new(id: RunId, status: RunStatus) -> Self {
        Self { id, status }
    }
}
