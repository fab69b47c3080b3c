//! Exponential backoff with jitter for storefront requests.
//!
//! Only transient failures are retried. A 404 or any other 4xx comes back
//! immediately because asking again returns the same answer.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Upper bound for one backoff sleep, including a server-supplied `Retry-After`.
const MAX_DELAY_MS: u64 = 5_000;

/// Returns `true` if `err` is worth retrying after a backoff delay.
///
/// Retriable: network failures, timeouts, HTTP 429, HTTP 5xx.
/// Everything else (404, other 4xx, unparseable bodies, bad URLs) is final.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(_) | ScraperError::Timeout { .. } | ScraperError::RateLimited { .. } => {
            true
        }
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::NotFound { .. }
        | ScraperError::Deserialize { .. }
        | ScraperError::InvalidStoreUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
fn base_delay_ms(backoff_base_ms: u64, attempt: u32, err: &ScraperError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(16));
    let requested = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    computed.max(requested).min(MAX_DELAY_MS)
}

/// Runs `operation`, retrying transient errors up to `max_retries` more times.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)` milliseconds scaled by a
/// random factor in `[0.75, 1.25)`, never longer than [`MAX_DELAY_MS`].
/// With `max_retries = 2` the operation runs at most three times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(backoff_base_ms, attempt, &err);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::debug!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
