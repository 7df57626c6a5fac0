//! Retry loop for async store operations.

use std::future::Future;

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::store::StoreError;

/// Runs `f` until it succeeds or the policy says stop, sleeping for the
/// backoff between attempts. `what` names the operation in log lines.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut f: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 1u32;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, classify::classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    tracing::warn!(attempt, delay_ms = d.as_millis() as u64, error = %e, "{} failed, retrying", what);
                    tokio::time::sleep(d).await;
                    attempt += 1;
                }
            },
        }
    }
}
