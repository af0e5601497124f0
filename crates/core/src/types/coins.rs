//! Coin amounts.
//!
//! Coins are the only currency in the game economy. They are whole,
//! non-negative units, so a balance can never go below zero by construction:
//! every subtraction goes through [`Coins::checked_sub`].

use core::fmt;
use core::iter::Sum;

use serde::{Deserialize, Serialize};

/// Errors from coin arithmetic.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinsError {
    /// The result would exceed the representable range.
    #[error("coin amount overflow")]
    Overflow,
}

/// A non-negative amount of coins.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Coins(u64);

impl Coins {
    /// Zero coins.
    pub const ZERO: Self = Self(0);

    /// Create an amount from a raw coin count.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`CoinsError::Overflow`] if the sum does not fit.
    pub const fn checked_add(self, other: Self) -> Result<Self, CoinsError> {
        match self.0.checked_add(other.0) {
            Some(v) => Ok(Self(v)),
            None => Err(CoinsError::Overflow),
        }
    }

    /// Subtract `other`, returning `None` if the result would be negative.
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Multiply a unit price by a quantity, saturating at `u64::MAX`.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Add two amounts, saturating at `u64::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Coins {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

impl From<Coins> for u64 {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl Sum for Coins {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_sub_refuses_negative() {
        assert_eq!(Coins::new(50).checked_sub(Coins::new(80)), None);
        assert_eq!(
            Coins::new(80).checked_sub(Coins::new(50)),
            Some(Coins::new(30))
        );
        assert_eq!(Coins::new(50).checked_sub(Coins::new(50)), Some(Coins::ZERO));
    }

    #[test]
    fn test_checked_add_overflow() {
        assert_eq!(
            Coins::new(u64::MAX).checked_add(Coins::new(1)),
            Err(CoinsError::Overflow)
        );
        assert_eq!(Coins::new(1).checked_add(Coins::new(2)), Ok(Coins::new(3)));
    }

    #[test]
    fn test_times_and_sum() {
        let total: Coins = [Coins::new(100).times(2), Coins::new(35).times(3)]
            .into_iter()
            .sum();
        assert_eq!(total, Coins::new(305));
    }
}
