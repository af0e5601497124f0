//! Retry executor for calls to unreliable dependencies.
//!
//! The operation classifies each attempt itself by returning an
//! [`AttemptOutcome`]; the executor never inspects error values. After every
//! attempt the executor decides, in this order:
//!
//! 1. success - return it
//! 2. non-retryable failure - return it, no further attempts
//! 3. attempt budget spent - return [`RetryError::Exhausted`] with the last cause
//! 4. otherwise wait out the backoff delay, unless the cancellation token
//!    fires first, which returns [`RetryError::Cancelled`] with the last cause

mod backoff;

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use backoff::{
    BackoffPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY,
    DEFAULT_MULTIPLIER, backoff_delay,
};

/// Result of a single attempt, classified by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    Success(T),
    /// A transient failure; trying again may help.
    RetryableFailure(E),
    /// A permanent failure; trying again will not help.
    NonRetryableFailure(E),
}

/// Terminal failure of a retried operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError<E> {
    /// The operation reported a permanent failure.
    #[error("non-retryable failure: {0}")]
    NonRetryable(E),

    /// Every attempt failed transiently.
    #[error("max retry attempts exceeded after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// Cancellation fired while waiting to retry.
    #[error("retry cancelled: {last}")]
    Cancelled { last: E },
}

impl<E> RetryError<E> {
    /// The underlying cause of the last attempt.
    pub const fn cause(&self) -> &E {
        match self {
            Self::NonRetryable(e)
            | Self::Exhausted { last: e, .. }
            | Self::Cancelled { last: e } => e,
        }
    }

    /// Consume the error and return the underlying cause.
    pub fn into_cause(self) -> E {
        match self {
            Self::NonRetryable(e)
            | Self::Exhausted { last: e, .. }
            | Self::Cancelled { last: e } => e,
        }
    }
}

/// Runs an async operation under a [`BackoffPolicy`].
///
/// Stateless; each call to [`execute`](Self::execute) keeps its own attempt
/// counter, so one executor can be shared between tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryExecutor {
    policy: BackoffPolicy,
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}

impl RetryExecutor {
    /// Create an executor. Unset policy fields fall back to the defaults.
    #[must_use]
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy: policy.normalized(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails permanently, runs out of
    /// attempts, or `cancel` fires during a backoff wait.
    ///
    /// # Errors
    ///
    /// Returns the [`RetryError`] describing why no attempt succeeded.
    pub async fn execute<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AttemptOutcome<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            let last = match operation().await {
                AttemptOutcome::Success(value) => return Ok(value),
                AttemptOutcome::NonRetryableFailure(e) => {
                    debug!(attempt = attempt + 1, error = %e, "Non-retryable failure");
                    return Err(RetryError::NonRetryable(e));
                }
                AttemptOutcome::RetryableFailure(e) => e,
            };

            let attempts = attempt + 1;
            if attempts >= self.policy.max_attempts {
                debug!(attempts, error = %last, "Retry attempts exhausted");
                return Err(RetryError::Exhausted { attempts, last });
            }

            let delay = self.policy.delay(attempt);
            warn!(
                attempt = attempts,
                max_attempts = self.policy.max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %last,
                "Attempt failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempts, error = %last, "Retry cancelled");
                    return Err(RetryError::Cancelled { last });
                }
                () = tokio::time::sleep(delay) => {}
            }

            attempt = attempts;
        }
    }
}
