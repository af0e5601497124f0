//! Exponential backoff policy.

use std::time::Duration;

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(100);
/// Default cap on any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);
/// Default growth factor between attempts.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// How many times to try and how long to wait in between.
///
/// Zero (or, for the multiplier, non-positive or non-finite) values fall back
/// to the defaults when the policy is normalized, which [`RetryExecutor`]
/// does before every run.
///
/// [`RetryExecutor`]: super::RetryExecutor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl BackoffPolicy {
    #[must_use]
    pub const fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    #[must_use]
    pub const fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    #[must_use]
    pub const fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Replace unset or invalid fields with the defaults.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            max_attempts: if self.max_attempts == 0 {
                DEFAULT_MAX_ATTEMPTS
            } else {
                self.max_attempts
            },
            initial_delay: if self.initial_delay.is_zero() {
                DEFAULT_INITIAL_DELAY
            } else {
                self.initial_delay
            },
            max_delay: if self.max_delay.is_zero() {
                DEFAULT_MAX_DELAY
            } else {
                self.max_delay
            },
            multiplier: if self.multiplier.is_finite() && self.multiplier > 0.0 {
                self.multiplier
            } else {
                DEFAULT_MULTIPLIER
            },
        }
    }

    /// Delay to wait after the failed attempt with the given 0-based index.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        backoff_delay(attempt, self.initial_delay, self.max_delay, self.multiplier)
    }
}

/// Delay before retry number `attempt` (0-based).
///
/// Attempt 0 returns exactly `initial`; attempt `n` returns
/// `min(initial * multiplier^n, max)`. Overflowing products saturate at `max`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)] // nanosecond counts stay far below 2^53 for any sane delay, and the result is clamped to `max`
pub fn backoff_delay(attempt: u32, initial: Duration, max: Duration, multiplier: f64) -> Duration {
    if attempt == 0 {
        return initial;
    }
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let nanos = initial.as_nanos() as f64 * multiplier.powi(exponent);
    if !nanos.is_finite() || nanos >= max.as_nanos() as f64 {
        return max;
    }
    Duration::from_nanos(nanos.round() as u64).min(max)
}
