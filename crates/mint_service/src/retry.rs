//! Bounded storage calls.
//!
//! Every storage future runs under `Policy::storage_timeout`; an elapsed
//! timer becomes `TransientStorage`. Only calls that are safe to repeat go
//! through [`retrying`]: reads, content-addressed blob writes and the
//! entitlement grant, whose receipt makes a second attempt a free replay.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

use mint_core::{Error, Result};

use crate::config::Policy;

const BASE_BACKOFF: Duration = Duration::from_millis(50);
const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// Doubling delay before retry `attempt` (1-based), capped at [`MAX_BACKOFF`].
fn backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    BASE_BACKOFF.saturating_mul(1 << exponent).min(MAX_BACKOFF)
}

pub(crate) async fn bounded<T, F>(policy: &Policy, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(policy.storage_timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::TransientStorage(format!(
            "storage call timed out after {:?}",
            policy.storage_timeout
        ))),
    }
}

pub(crate) async fn retrying<T, F, Fut>(policy: &Policy, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match bounded(policy, call()).await {
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = backoff(attempt);
                warn!(operation, attempt, ?delay, error = %e, "Retrying storage call");
                sleep(delay).await;
            }
            other => return other,
        }
    }
}
