//! Fixed-point monetary type for wallet balances and bid amounts.
//!
//! All monetary values use fixed-point arithmetic with 4 decimal places to
//! avoid floating-point precision issues. Bid increments like 0.5 and bids
//! like 10.25 are exact.

use derive_more::{Add, AddAssign, From, Into, Neg, Sub, SubAssign, Sum};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money scale factor: 10,000 means 4 decimal places.
/// - `10000` = 1.00
/// - `1` = 0.0001 (smallest representable amount)
pub const MONEY_SCALE: i64 = 10_000;

/// Fixed-point monetary amount with 4 decimal places.
///
/// Used for base prices, bids, wallet balances, and sale prices.
///
/// # Examples
/// - `Money(10000)` = 1.00
/// - `Money(105000)` = 10.50
/// - `Money(5000)` = 0.50
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Add,
    Sub,
    Neg,
    AddAssign,
    SubAssign,
    Sum,
    From,
    Into,
)]
pub struct Money(pub i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Create a Money value from a floating-point amount.
    #[inline]
    pub fn from_float(v: f64) -> Self {
        Self((v * MONEY_SCALE as f64).round() as i64)
    }

    /// Convert to floating-point for display/reporting.
    #[inline]
    pub fn to_float(self) -> f64 {
        self.0 as f64 / MONEY_SCALE as f64
    }

    /// Raw internal value.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Check if the amount is strictly positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Saturating subtraction, clamped at zero.
    #[inline]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Money((self.0 - rhs.0).max(0))
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({:.2})", self.to_float())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_float())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_float() {
        assert_eq!(Money::from_float(1.0), Money(10_000));
        assert_eq!(Money::from_float(10.5), Money(105_000));
        assert_eq!(Money::from_float(0.5), Money(5_000));
        assert_eq!(Money::from_float(10.25), Money(102_500));
    }

    #[test]
    fn test_money_to_float() {
        assert!((Money(10_000).to_float() - 1.0).abs() < 1e-10);
        assert!((Money(105_000).to_float() - 10.5).abs() < 1e-10);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_float(100.0);
        let b = Money::from_float(37.5);

        assert_eq!((a - b).to_float(), 62.5);
        assert_eq!((a + b).to_float(), 137.5);
    }

    #[test]
    fn test_money_increment_is_exact() {
        // 10 + 0.5 must land exactly on 10.5, never 10.499999.
        let floor = Money::from_float(10.0) + Money::from_float(0.5);
        assert_eq!(floor, Money::from_float(10.5));
        assert!(Money::from_float(10.25) < floor);
    }

    #[test]
    fn test_money_saturating_sub() {
        let a = Money::from_float(5.0);
        let b = Money::from_float(8.0);
        assert_eq!(a.saturating_sub(b), Money::ZERO);
    }
}
