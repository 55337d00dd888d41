//! Retry policy for Reddit requests.
//!
//! Rate-limited responses wait out Reddit's advertised reset window. Other
//! transient failures back off exponentially with jitter. Auth rejections,
//! other 4xx responses and malformed payloads fail on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::SentimentError;

/// Reddit's rate-limit window is ten minutes.
const RATE_WINDOW_SECS: u64 = 600;
const MAX_BACKOFF_MS: u64 = 60_000;

pub(crate) fn is_retriable(err: &SentimentError) -> bool {
    match err {
        SentimentError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SentimentError::Status { status, .. } => (500..600).contains(status),
        SentimentError::RateLimited { .. } => true,
        SentimentError::Reddit(_)
        | SentimentError::Deserialize { .. }
        | SentimentError::Polarity(_) => false,
    }
}

/// Wait before retry number `attempt` (1-based).
///
/// A rate limit with a known reset sleeps until the reset, capped at one
/// window. Everything else sleeps `base_ms * 2^(attempt-1)`, capped at 60 s,
/// with ±25% jitter.
pub(crate) fn delay_before_retry(err: &SentimentError, attempt: u32, base_ms: u64) -> Duration {
    if let SentimentError::RateLimited {
        reset_secs: Some(secs),
        ..
    } = err
    {
        return Duration::from_secs((*secs).min(RATE_WINDOW_SECS));
    }

    let exponent = attempt.saturating_sub(1).min(10);
    let backoff_ms = base_ms.saturating_mul(1u64 << exponent).min(MAX_BACKOFF_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (backoff_ms as f64 * rand::random_range(0.75..1.25)) as u64;
    Duration::from_millis(jittered)
}

/// Run `request`, retrying transient failures up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut request: F,
) -> Result<T, SentimentError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SentimentError>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        attempt += 1;
        let delay = delay_before_retry(&err, attempt, backoff_base_ms);
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "reddit request failed; retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
