//! How long the relay waits for a run to finish.

use std::time::Duration;

/// Default delay between run status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(700);

/// Default number of status checks before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 200;

/// Bounded polling policy for run status.
///
/// The first status check happens immediately after the run is created;
/// `interval` separates consecutive checks. After `max_attempts` checks
/// without a terminal status the request fails with a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Upper bound on time spent sleeping between checks.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}
