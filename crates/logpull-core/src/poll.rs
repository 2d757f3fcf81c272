//! Bounded polling policy shared by both Logs API clients.
//!
//! Log preparation is asynchronous on the server side, so both clients
//! re-check a remote resource until it reaches a terminal state. The number of
//! checks is always bounded; running out of attempts is reported as a distinct
//! outcome by the callers rather than silently falling through.

use std::time::Duration;

use crate::error::ConfigError;

/// Default number of status checks before a poll loop gives up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// Default delay between two status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Attempt budget and fixed delay for a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of requests issued by one poll loop. Must be at least 1.
    pub max_attempts: u32,
    /// Delay between two attempts.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_ATTEMPTS)
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// No delay between checks. Intended for offline runs against fake transports.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::fixed(Duration::ZERO, max_attempts)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// A loop that may never check the remote state is a configuration error.
    pub fn ensure_attempts(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::NoPollAttempts);
        }
        Ok(())
    }

    /// Sleep for one interval. Zero intervals return without touching the timer.
    pub async fn wait(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}
