//! Business logic services for the game economy.
//!
//! # Services
//!
//! - `retry` - Backoff policy and retry executor for unreliable calls
//! - `idempotency` - Replay cache for side-effecting requests
//! - `payment` - Payment gateway abstraction and the in-process stub
//! - `shop` - Owner of the player and cart state
//! - `checkout` - The checkout transaction pipeline

pub mod checkout;
pub mod idempotency;
pub mod payment;
pub mod retry;
pub mod shop;

pub use checkout::{CheckoutOutcome, CheckoutResponse, CheckoutService, Receipt};
pub use idempotency::IdempotencyCache;
pub use payment::{GatewayError, PaymentGateway, RecordedCharge, StubGateway};
pub use retry::{AttemptOutcome, BackoffPolicy, RetryError, RetryExecutor};
pub use shop::ShopService;
