//! Bounded retry around a rate-limited operation.
//!
//! The wrapper deliberately swallows every operation-level failure into a
//! `None` result: a misbehaving contact must never propagate an error into
//! the batch driver. Callers treat `None` as "skipped this cycle".

use std::time::Duration;

use tracing::{debug, warn};

use courier_types::error::ApiError;

/// Maximum rate-limited invocations before the operation is abandoned.
pub const MAX_RATE_LIMIT_ATTEMPTS: u32 = 3;

/// Padding added on top of the server-suggested retry-after duration.
const RETRY_PADDING: Duration = Duration::from_millis(100);

/// Run `operation`, retrying on rate-limit failures with the
/// server-suggested backoff plus padding.
///
/// - Rate-limited failure: sleep `retry_after + 100ms` and retry, until
///   [`MAX_RATE_LIMIT_ATTEMPTS`] invocations have failed; then abandon with
///   `None` (a further attempt is never made, even if it would succeed).
/// - Any other failure: log and return `None` immediately, no retry.
pub async fn execute_with_retry<T, F, Fut>(label: &str, mut operation: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 0;
    loop {
        if attempt >= MAX_RATE_LIMIT_ATTEMPTS {
            warn!(%label, attempt, "rate limit retries exhausted, abandoning operation");
            return None;
        }

        match operation().await {
            Ok(value) => return Some(value),
            Err(ApiError::RateLimited { retry_after }) => {
                attempt += 1;
                let backoff = retry_after + RETRY_PADDING;
                debug!(%label, attempt, ?backoff, "rate limited, backing off");
                tokio::time::sleep(backoff).await;
            }
            Err(err) => {
                warn!(%label, error = %err, "operation failed, skipping");
                return None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
