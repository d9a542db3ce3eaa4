//! Application-level configuration.
//!
//! Controls how the review use cases behave: overall time limit, outer audit
//! attempts and finding-filter concurrency.

use std::time::Duration;

/// Review behavior configuration.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Time limit for a whole audit run. `None` disables the limit.
    pub timeout: Option<Duration>,
    /// Outer audit attempts (each one runs `call_with_retry`).
    pub audit_attempts: u32,
    /// Pause before an outer audit retry.
    pub attempt_delay: Duration,
    /// Token limit for the audit reply.
    pub audit_max_tokens: u32,
    /// Prompts above this size are logged as a warning.
    pub large_prompt_bytes: usize,
    /// Concurrent single-finding analyses.
    pub filter_concurrency: usize,
}

impl ReviewConfig {
    pub const DEFAULT_TIMEOUT_MINUTES: u64 = 20;

    /// Creates a ReviewConfig from an optional timeout in minutes.
    ///
    /// `None` keeps the default limit; `Some(0)` disables it.
    pub fn from_timeout_minutes(minutes: Option<u64>) -> Self {
        let timeout = match minutes {
            Some(0) => None,
            Some(m) => Some(Duration::from_secs(m * 60)),
            None => Some(Duration::from_secs(Self::DEFAULT_TIMEOUT_MINUTES * 60)),
        };
        Self {
            timeout,
            ..Self::default()
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(Self::DEFAULT_TIMEOUT_MINUTES * 60)),
            audit_attempts: 2,
            attempt_delay: Duration::from_secs(2),
            audit_max_tokens: 16384,
            large_prompt_bytes: 1024 * 1024,
            filter_concurrency: 4,
        }
    }
}
