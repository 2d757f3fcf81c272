//! Client configuration.
//!
//! Every client receives its own [`ClientConfig`] at construction; there are
//! no process-wide defaults to mutate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poll::PollPolicy;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Runtime settings shared by both Logs API clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Per-request timeout in milliseconds. Defaults to 30 s.
    pub timeout_ms: u64,
    /// Attempt budget and delay between status checks. Defaults to 100 × 30 s.
    pub poll: PollPolicy,
    /// Directory receiving exported files. Defaults to the working directory.
    pub output_dir: PathBuf,
    /// Overrides the vendor host, e.g. for a proxy. `None` uses the vendor default.
    pub base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll: PollPolicy::default(),
            output_dir: PathBuf::from("."),
            base_url: None,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub(crate) fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(default)
    }

    pub(crate) fn output_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(file_name)
    }
}
