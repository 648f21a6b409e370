use std::time::Duration;

/// Retry budget and delay schedule.
///
/// After failed attempt `i` (1-based) the caller waits
/// `base_delay * 2^(i-1)`, clamped to `max_delay` when set. No jitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    /// Total attempts including the first one. Never less than 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Option<Duration>,
}

impl Backoff {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: None,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay to wait after the given failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor);

        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// The full schedule for an operation that fails every attempt.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|i| self.delay_after(i)).collect()
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}
