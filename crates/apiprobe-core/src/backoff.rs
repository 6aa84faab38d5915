//! Retry and backoff policies.
//!
//! A backoff policy is a plain function value from retry index to delay.
//! Index 1 is the wait before the first retry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Maps retry index (1-based) to the delay before that retry.
#[derive(Clone)]
pub struct BackoffPolicy {
    delay_for: Arc<dyn Fn(u32) -> Duration + Send + Sync>,
    label: &'static str,
}

impl BackoffPolicy {
    /// Wrap an arbitrary function.
    pub fn from_fn(f: impl Fn(u32) -> Duration + Send + Sync + 'static) -> Self {
        Self {
            delay_for: Arc::new(f),
            label: "custom",
        }
    }

    /// `step * index`: 1s, 2s, 3s... for a one second step.
    pub fn linear(step: Duration) -> Self {
        Self {
            delay_for: Arc::new(move |index| step.saturating_mul(index)),
            label: "linear",
        }
    }

    /// Zero delay between attempts.
    pub fn none() -> Self {
        Self {
            delay_for: Arc::new(|_| Duration::ZERO),
            label: "none",
        }
    }

    /// Full-jitter exponential backoff: uniform in `0..=min(base * 2^index, cap)`,
    /// never below 10ms.
    pub fn exponential_jitter(base: Duration, cap: Duration) -> Self {
        Self {
            delay_for: Arc::new(move |index| {
                use rand::Rng;

                let factor = 1u32.checked_shl(index.min(31)).unwrap_or(u32::MAX);
                let ceiling = base.saturating_mul(factor).min(cap);
                let jittered_ms =
                    rand::thread_rng().gen_range(0..=ceiling.as_millis() as u64);
                Duration::from_millis(jittered_ms.max(10))
            }),
            label: "exponential_jitter",
        }
    }

    pub fn delay(&self, index: u32) -> Duration {
        (self.delay_for)(index)
    }
}

impl fmt::Debug for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffPolicy")
            .field("kind", &self.label)
            .finish()
    }
}

/// How many times a request is attempted and how long to wait in between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffPolicy,
}

impl RetryPolicy {
    /// `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, backoff: BackoffPolicy) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// One attempt, no retry.
    pub fn single_attempt() -> Self {
        Self::new(1, BackoffPolicy::none())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self, retry_index: u32) -> Duration {
        self.backoff.delay(retry_index)
    }

    /// Sum of every wait an always-failing request goes through.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|i| self.delay(i))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, BackoffPolicy::linear(Duration::from_secs(1)))
    }
}
