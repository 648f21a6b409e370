use thiserror::Error;

/// Classifies an error for the retry loop.
///
/// Transient errors (timeouts, dropped connections, 5xx) get another
/// attempt; anything else stops the loop at once.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

/// Why a retried operation gave up.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The operation returned a non-transient error; no further attempts made.
    #[error("permanent failure: {0}")]
    Permanent(E),

    /// Every attempt failed with a transient error.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    /// The error returned by the final attempt.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Permanent(e) => e,
            RetryError::Exhausted { last, .. } => last,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }
}
