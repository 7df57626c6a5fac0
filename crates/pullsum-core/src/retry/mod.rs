//! Retry: transient-failure backoff and failed-file re-runs.
//!
//! Two layers share this module. Inside a run, opening a remote stream is
//! retried with exponential backoff when the failure looks transient
//! (timeouts, throttling, connection errors, 5xx). Across runs, the retry
//! selector picks the files whose previous outcome was `mismatch` or `error`
//! and merges the re-run's results over the previous list.

mod classify;
mod policy;
mod run;
mod select;

pub use classify::{classify, classify_curl_error, classify_http_status, classify_io_error};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
pub use select::{failed_keys, merge_results, select_retry};
