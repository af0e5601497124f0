//! Checkout transaction.
//!
//! A checkout moves through typed phases:
//!
//! ```text
//! replay? ──hit──▶ cached response
//!    │ miss
//!    ▼
//! validate ──▶ ValidatedCheckout ──charge──▶ ChargedCheckout ──apply──▶ outcome
//! ```
//!
//! Validation and application each run under the shop's exclusive lock. The
//! charge runs between them with no lock held, so a slow gateway never blocks
//! other requests. Whatever the outcome, it is stored under the idempotency key
//! before being returned.
//!
//! A request that arrives while an earlier one with the same key is still
//! running waits for that run and answers with its response.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use snake_shop_core::{CheckoutStatus, Coins, FailureReason, ItemId};
use tokio::sync::{Mutex, OnceCell};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::idempotency::IdempotencyCache;
use super::payment::PaymentGateway;
use super::retry::{AttemptOutcome, BackoffPolicy, RetryExecutor};
use super::shop::ShopService;
use crate::config::CheckoutConfig;
use crate::models::CartLine;

/// Attempts made against the gateway per checkout.
pub const CHARGE_MAX_ATTEMPTS: u32 = 5;
/// Wait before the first charge retry.
pub const CHARGE_INITIAL_DELAY: Duration = Duration::from_millis(100);
/// Cap on the wait between charge retries.
pub const CHARGE_MAX_DELAY: Duration = Duration::from_secs(5);

/// Status code and JSON body produced by a checkout.
///
/// This is exactly what gets stored in, and replayed from, the idempotency
/// cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Terminal result of a checkout that ran (as opposed to a replay).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Success(Receipt),
    Fail {
        reason: FailureReason,
        /// Reported for insufficient balance only.
        balance: Option<Coins>,
    },
}

/// Player state after a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub balance: Coins,
    pub owned_skins: Vec<ItemId>,
    pub equipped_skin: ItemId,
    pub extra_lives: u32,
}

impl CheckoutOutcome {
    const fn fail(reason: FailureReason) -> Self {
        Self::Fail {
            reason,
            balance: None,
        }
    }

    #[must_use]
    pub const fn checkout_status(&self) -> CheckoutStatus {
        match self {
            Self::Success(_) => CheckoutStatus::Success,
            Self::Fail { .. } => CheckoutStatus::Fail,
        }
    }

    /// HTTP status the outcome is reported with.
    ///
    /// Validation failures are a normal answer for the game client and use
    /// 200; only an unavailable payment provider is a 503.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::Fail {
                reason: FailureReason::PaymentUnavailable,
                ..
            } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::OK,
        }
    }

    /// Wire body. Keys serialize in sorted order.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let status = self.checkout_status();
        match self {
            Self::Success(receipt) => json!({
                "Status": status,
                "Message": "Purchase complete!",
                "Balance": receipt.balance,
                "OwnedSkins": receipt.owned_skins,
                "EquippedSkin": receipt.equipped_skin,
                "ExtraLives": receipt.extra_lives,
            }),
            Self::Fail {
                reason,
                balance: Some(balance),
            } => json!({
                "Status": status,
                "Message": reason.message(),
                "Balance": balance,
            }),
            Self::Fail {
                reason,
                balance: None,
            } => json!({
                "Status": status,
                "Message": reason.message(),
            }),
        }
    }

    #[must_use]
    pub fn into_checkout_response(self) -> CheckoutResponse {
        CheckoutResponse {
            status: self.http_status(),
            body: self.to_json().to_string().into_bytes(),
        }
    }
}

/// Cart snapshot and charge total that passed validation.
#[derive(Debug)]
struct ValidatedCheckout {
    lines: Vec<CartLine>,
    charge_total: Coins,
}

/// A validated checkout whose charge the gateway accepted.
#[derive(Debug)]
struct ChargedCheckout(ValidatedCheckout);

/// Response slot shared by every request running under one key.
type InFlight = Arc<OnceCell<CheckoutResponse>>;

/// Coordinates validation, payment and fulfilment of the cart.
#[derive(Clone)]
pub struct CheckoutService {
    shop: ShopService,
    idempotency: IdempotencyCache,
    in_flight: Arc<Mutex<HashMap<String, InFlight>>>,
    executor: RetryExecutor,
    deadline: Duration,
}

impl CheckoutService {
    #[must_use]
    pub fn new(shop: ShopService, idempotency: IdempotencyCache, config: &CheckoutConfig) -> Self {
        let policy = BackoffPolicy::default()
            .max_attempts(CHARGE_MAX_ATTEMPTS)
            .initial_delay(CHARGE_INITIAL_DELAY)
            .max_delay(CHARGE_MAX_DELAY);
        Self {
            shop,
            idempotency,
            in_flight: Arc::default(),
            executor: RetryExecutor::new(policy),
            deadline: config.deadline,
        }
    }

    #[must_use]
    pub const fn idempotency(&self) -> &IdempotencyCache {
        &self.idempotency
    }

    /// Run a checkout of the current cart.
    ///
    /// With an idempotency key, a response stored earlier under that key is
    /// returned verbatim without touching the cart, the player or the gateway.
    /// Concurrent requests with the same key share a single run.
    #[instrument(skip(self, gateway))]
    pub async fn checkout(
        &self,
        idempotency_key: Option<&str>,
        gateway: &dyn PaymentGateway,
    ) -> CheckoutResponse {
        let Some(key) = idempotency_key.filter(|k| !k.is_empty()) else {
            return self.execute(None, gateway).await;
        };
        if let Some(cached) = self.replay(key).await {
            return cached;
        }

        let slot = Arc::clone(self.in_flight.lock().await.entry(key.to_owned()).or_default());
        let response = slot
            .get_or_init(|| async move {
                // The previous holder of this key may have finished in between.
                if let Some(cached) = self.replay(key).await {
                    return cached;
                }
                let response = self.execute(Some(key), gateway).await;
                self.idempotency
                    .store(key, response.status, &response.body)
                    .await;
                response
            })
            .await
            .clone();

        let mut in_flight = self.in_flight.lock().await;
        if in_flight.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
            in_flight.remove(key);
        }
        response
    }

    async fn replay(&self, key: &str) -> Option<CheckoutResponse> {
        let cached = self.idempotency.lookup(key).await?;
        debug!("Replaying cached checkout response");
        Some(CheckoutResponse {
            status: cached.status,
            body: cached.body,
        })
    }

    async fn execute(&self, key: Option<&str>, gateway: &dyn PaymentGateway) -> CheckoutResponse {
        let outcome = self.run(key, gateway).await;
        match &outcome {
            CheckoutOutcome::Success(receipt) => {
                info!(balance = %receipt.balance, "Checkout succeeded");
            }
            CheckoutOutcome::Fail { reason, .. } => {
                info!(?reason, "Checkout failed");
            }
        }
        outcome.into_checkout_response()
    }

    async fn run(&self, key: Option<&str>, gateway: &dyn PaymentGateway) -> CheckoutOutcome {
        let deadline = Instant::now() + self.deadline;

        let validated = match self.validate().await {
            Ok(validated) => validated,
            Err(outcome) => return outcome,
        };
        let charged = match self.charge(validated, key, gateway, deadline).await {
            Ok(charged) => charged,
            Err(outcome) => return outcome,
        };
        self.apply(charged).await
    }

    /// Check the cart against the player and compute the charge total.
    ///
    /// Skins the player already owns are not charged for.
    async fn validate(&self) -> Result<ValidatedCheckout, CheckoutOutcome> {
        let state = self.shop.exclusive().await;
        if state.cart.is_empty() {
            return Err(CheckoutOutcome::fail(FailureReason::CartEmpty));
        }

        let charge_total = chargeable_total(state.cart.lines(), |id| state.player.owns(id));
        let balance = state.player.balance();
        if charge_total > balance {
            debug!(%charge_total, %balance, "Balance does not cover cart");
            return Err(CheckoutOutcome::Fail {
                reason: FailureReason::InsufficientBalance,
                balance: Some(balance),
            });
        }

        Ok(ValidatedCheckout {
            lines: state.cart.lines().to_vec(),
            charge_total,
        })
    }

    /// Charge the gateway, retrying timeouts, until success, a permanent
    /// failure, attempt exhaustion, or the deadline.
    async fn charge(
        &self,
        validated: ValidatedCheckout,
        key: Option<&str>,
        gateway: &dyn PaymentGateway,
        deadline: Instant,
    ) -> Result<ChargedCheckout, CheckoutOutcome> {
        let amount = validated.charge_total;
        let cancel = CancellationToken::new();
        let token = &cancel;

        let attempt = move || async move {
            match gateway.charge(amount, key, token).await {
                Ok(()) => AttemptOutcome::Success(()),
                Err(e) if e.is_retryable() => AttemptOutcome::RetryableFailure(e),
                Err(e) => AttemptOutcome::NonRetryableFailure(e),
            }
        };

        let charge = self.executor.execute(attempt, token);
        tokio::pin!(charge);
        let result = tokio::select! {
            result = &mut charge => result,
            () = tokio::time::sleep_until(deadline) => {
                warn!("Checkout deadline reached while charging");
                cancel.cancel();
                charge.await
            }
        };

        match result {
            Ok(()) => Ok(ChargedCheckout(validated)),
            Err(e) => {
                warn!(error = %e, "Payment failed");
                Err(CheckoutOutcome::fail(FailureReason::PaymentUnavailable))
            }
        }
    }

    /// Debit the player and fulfil the cart as one critical section.
    async fn apply(&self, charged: ChargedCheckout) -> CheckoutOutcome {
        let ChargedCheckout(validated) = charged;
        let mut state = self.shop.exclusive().await;

        if !state.player.debit(validated.charge_total) {
            // Another checkout spent the balance while this one was charging.
            let balance = state.player.balance();
            warn!(
                charge_total = %validated.charge_total,
                %balance,
                "Balance drained during charge"
            );
            return CheckoutOutcome::Fail {
                reason: FailureReason::InsufficientBalance,
                balance: Some(balance),
            };
        }

        let mut last_new_skin = None;
        for line in &validated.lines {
            if line.kind.is_skin() {
                if state.player.grant_skin(&line.item_id) {
                    last_new_skin = Some(&line.item_id);
                }
            } else {
                state
                    .player
                    .add_extra_lives(line.extra_lives.saturating_mul(line.quantity));
            }
        }
        if let Some(skin) = last_new_skin {
            state.player.equip_granted(skin);
        }
        state.cart.clear();

        CheckoutOutcome::Success(Receipt {
            balance: state.player.balance(),
            owned_skins: state.player.owned_skins().to_vec(),
            equipped_skin: state.player.equipped_skin().clone(),
            extra_lives: state.player.extra_lives(),
        })
    }
}

/// Sum of line totals, skipping skins for which `owned` holds.
fn chargeable_total(lines: &[CartLine], owned: impl Fn(&str) -> bool) -> Coins {
    lines
        .iter()
        .filter(|line| !(line.kind.is_skin() && owned(line.item_id.as_str())))
        .map(CartLine::line_total)
        .sum()
}
