//! Status enums for checkout outcomes.

use serde::{Deserialize, Serialize};

/// Terminal status of a checkout as seen by the client.
///
/// Serialized as `"Success"` / `"Fail"`, which is what the game frontend
/// matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutStatus {
    Success,
    Fail,
}

/// Why a checkout failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The cart had no lines; nothing was charged.
    CartEmpty,
    /// The chargeable total exceeded the balance; nothing was charged.
    InsufficientBalance,
    /// The payment gateway could not be reached or refused the charge.
    PaymentUnavailable,
}

impl FailureReason {
    /// Human-readable message shown to the player.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::CartEmpty => "Cart is empty",
            Self::InsufficientBalance => "Not enough coins",
            Self::PaymentUnavailable => "Payment temporarily unavailable. Please try again.",
        }
    }
}
