//! Retry primitives for calls to unreliable dependencies.
//!
//! - [`Backoff`]: attempt budget and the doubling delay schedule
//! - [`Sleeper`]: how the wait between attempts happens ([`TokioSleeper`] in
//!   production, [`RecordingSleeper`] in tests)
//! - [`Retryable`]: lets an error say whether another attempt can help
//! - [`retry_with_backoff`]: the loop tying them together
//!
//! # Example
//!
//! ```ignore
//! use resilience::{Backoff, TokioSleeper, retry_with_backoff};
//!
//! let backoff = Backoff::default(); // 3 attempts, 500ms, 1s
//! let body = retry_with_backoff(&backoff, &TokioSleeper, |attempt| {
//!     tracing::debug!(attempt, "calling upstream");
//!     client.fetch(&key)
//! })
//! .await?;
//! ```

mod backoff;
mod error;
mod retry;
mod sleeper;

pub use backoff::Backoff;
pub use error::{RetryError, Retryable};
pub use retry::retry_with_backoff;
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
