//! Backoff for opening object streams and fetching manifests within one run.
//!
//! Only the open is ever retried: once bytes reach the destination file a
//! failure settles the file as `error`, and `pullsum retry` picks it up.

use std::time::Duration;

use crate::config::RetryConfig;

/// Why an object store open failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connect or transfer timeout from the store backend.
    Timeout,
    /// The store answered 429 or 503.
    Throttled,
    /// Reset, refused or unresolved endpoint.
    Connection,
    /// Other 5xx from the store.
    Http5xx(u16),
    /// Missing object, bad key, 4xx or local I/O. Retrying cannot help.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Attempt limit and doubling delay for stream opens, from `[retry]` in
/// `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Opens per object, the first included. At least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(cfg.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }

    /// A single open per object.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Whether open number `attempt` (1-based) gets another try, and after
    /// how long: `base_delay` doubled per earlier attempt, capped at `max_delay`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::Throttled
            | ErrorKind::Http5xx(_) => {
                let factor = 1u32 << attempt.saturating_sub(1).min(8);
                let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
                RetryDecision::RetryAfter(delay)
            }
        }
    }
}
