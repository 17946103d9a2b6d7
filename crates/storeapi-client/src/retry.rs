//! Bounded retry with exponential back-off and jitter.
//!
//! Only transport failures are retried: the request never produced an HTTP
//! response, so re-sending it is the only way to learn the outcome. Any
//! response the server did send (including 4xx/5xx) is final.

use std::future::Future;
use std::time::Duration;

use crate::error::ApiError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** [`ApiError::Transport`] (connect failure, timeout, body
/// read failure).
///
/// Everything else is returned to the caller on the first occurrence.
pub(crate) fn is_retriable(err: &ApiError) -> bool {
    matches!(err, ApiError::Transport(_))
}

const MAX_DELAY_MS: u64 = 30_000;

/// Sleep before retry number `retry` (1-based): `base_ms × 2^(retry-1)`,
/// capped at 30 s, then scaled by a random factor in `[0.75, 1.25)`.
fn backoff_delay(base_ms: u64, retry: u32) -> Duration {
    let doublings = retry.saturating_sub(1).min(10);
    let nominal = base_ms.saturating_mul(1 << doublings).min(MAX_DELAY_MS);
    Duration::from_millis(nominal).mul_f64(rand::random_range(0.75..1.25))
}

/// Runs `operation` until it succeeds, fails with a non-retriable error, or
/// has been retried `max_retries` times after transport errors.
///
/// With `backoff_base_ms = 500` the sleeps before retries 1, 2 and 3 are
/// roughly 500 ms, 1 s and 2 s (see [`backoff_delay`]). With
/// `max_retries = 3` the operation runs at most 4 times; the last transport
/// error is returned once the retries are used up.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    for retry in 1..=max_retries {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) => err,
            Err(err) => return Err(err),
        };
        let delay = backoff_delay(backoff_base_ms, retry);
        tracing::warn!(
            retry,
            max_retries,
            ?delay,
            error = %err,
            "store API transport error, retrying"
        );
        tokio::time::sleep(delay).await;
    }
    operation().await
}
