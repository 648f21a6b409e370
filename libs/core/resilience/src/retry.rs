use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

use crate::{Backoff, RetryError, Retryable, Sleeper};

/// Run `operation` until it succeeds, fails permanently, or the attempt
/// budget runs out.
///
/// The closure receives the 1-based attempt number. Between attempts the
/// loop asks `sleeper` to wait `backoff.delay_after(attempt)`; no wait
/// follows the final attempt.
pub async fn retry_with_backoff<F, Fut, T, E>(
    backoff: &Backoff,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = backoff.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                debug!(attempt, error = %e, "Permanent failure, not retrying");
                return Err(RetryError::Permanent(e));
            }
            Err(e) if attempt >= max_attempts => {
                warn!(attempts = attempt, error = %e, "Retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: e,
                });
            }
            Err(e) => {
                let delay = backoff.delay_after(attempt);
                debug!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, retrying"
                );
                sleeper.sleep(delay).await;
            }
        }
    }
}
