//! Payment gateway abstraction.
//!
//! The gateway is the only external dependency of checkout. Implementations
//! must tolerate being called several times with the same idempotency key;
//! the checkout pipeline retries transient failures.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use snake_shop_core::Coins;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Errors a gateway can report for a charge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The gateway did not answer in time.
    #[error("payment gateway timeout")]
    Timeout,

    /// The gateway refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The caller gave up while the charge was in flight.
    #[error("payment cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Whether trying the same charge again might succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// Something that can charge the player.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` coins.
    ///
    /// `idempotency_key` scopes the logical request; repeated calls with the
    /// same key must not charge twice. Implementations should stop waiting
    /// and return [`GatewayError::Cancelled`] once `cancel` fires.
    async fn charge(
        &self,
        amount: Coins,
        idempotency_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<(), GatewayError>;
}

/// A charge request as the gateway received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCharge {
    pub amount: Coins,
    pub idempotency_key: Option<String>,
}

/// In-process gateway used in place of a real payment provider.
///
/// Succeeds immediately unless told to simulate timeouts or a slow response.
/// Records every charge attempt it sees.
#[derive(Debug, Default)]
pub struct StubGateway {
    simulate_timeout: bool,
    timeouts_before_success: u32,
    simulate_delay: Duration,
    attempts: AtomicU32,
    charges: Mutex<Vec<RecordedCharge>>,
}

impl StubGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway that reports [`GatewayError::Timeout`] on every call.
    #[must_use]
    pub fn timing_out() -> Self {
        Self::new().simulate_timeout(true)
    }

    #[must_use]
    pub const fn simulate_timeout(mut self, enabled: bool) -> Self {
        self.simulate_timeout = enabled;
        self
    }

    /// Report [`GatewayError::Timeout`] for the first `count` calls only.
    #[must_use]
    pub const fn timeouts_before_success(mut self, count: u32) -> Self {
        self.timeouts_before_success = count;
        self
    }

    /// Sleep this long before answering each call.
    #[must_use]
    pub const fn simulate_delay(mut self, delay: Duration) -> Self {
        self.simulate_delay = delay;
        self
    }

    /// How many times `charge` has been called.
    #[must_use]
    pub fn charge_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Every charge received so far, oldest first.
    #[must_use]
    pub fn charges(&self) -> Vec<RecordedCharge> {
        self.charges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    #[instrument(skip(self, cancel))]
    async fn charge(
        &self,
        amount: Coins,
        idempotency_key: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<(), GatewayError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(attempt, %amount, "Stub gateway charge");
        self.charges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCharge {
                amount,
                idempotency_key: idempotency_key.map(str::to_owned),
            });

        if !self.simulate_delay.is_zero() {
            tokio::select! {
                () = cancel.cancelled() => return Err(GatewayError::Cancelled),
                () = tokio::time::sleep(self.simulate_delay) => {}
            }
        }
        if self.simulate_timeout || attempt <= self.timeouts_before_success {
            return Err(GatewayError::Timeout);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_succeeds_by_default() {
        let gateway = StubGateway::new();
        let result = gateway
            .charge(Coins::new(100), Some("key"), &CancellationToken::new())
            .await;
        assert!(result.is_ok());
        assert_eq!(gateway.charge_attempts(), 1);
        assert_eq!(
            gateway.charges(),
            [RecordedCharge {
                amount: Coins::new(100),
                idempotency_key: Some("key".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_stub_times_out_then_succeeds() {
        let gateway = StubGateway::new().timeouts_before_success(2);
        let cancel = CancellationToken::new();

        for _ in 0..2 {
            let result = gateway.charge(Coins::new(50), None, &cancel).await;
            assert_eq!(result, Err(GatewayError::Timeout));
        }
        assert!(gateway.charge(Coins::new(50), None, &cancel).await.is_ok());
        assert_eq!(gateway.charge_attempts(), 3);
    }

    #[tokio::test]
    async fn test_stub_simulated_timeout() {
        let gateway = StubGateway::timing_out();
        let result = gateway
            .charge(Coins::new(100), None, &CancellationToken::new())
            .await;
        assert_eq!(result, Err(GatewayError::Timeout));
        assert!(result.unwrap_err().is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stub_delay_honours_cancellation() {
        let gateway = StubGateway::new().simulate_delay(Duration::from_secs(10));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = gateway.charge(Coins::new(1), None, &cancel).await;
        assert_eq!(result, Err(GatewayError::Cancelled));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(GatewayError::Timeout.is_retryable());
        assert!(!GatewayError::Declined("card".to_string()).is_retryable());
        assert!(!GatewayError::Cancelled.is_retryable());
    }
}
