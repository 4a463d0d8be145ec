//! # Money Module
//!
//! Provides the `Money` type for monetary values in the smallest currency
//! unit. Menu prices arrive in whole Rupiah, so one unit is one Rupiah.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing 0.1 + 0.2 in floating point gives 0.30000000000000004.         │
//! │  A cart total that drifts by one unit between the checkout screen and   │
//! │  the bill screen is a support ticket.                                   │
//! │                                                                         │
//! │  OUR SOLUTION: every amount is an i64 and every percentage step is      │
//! │  rounded at the point it is produced, so each view gets the same sum.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use meja_core::money::Money;
//!
//! let price = Money::new(18_000);
//! let line = price * 2;
//! assert_eq!(line.amount(), 36_000);
//! assert_eq!(line.percent(10.0).amount(), 3_600);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: rounding adjustments can be negative
/// - **Single field tuple struct**: serialises as a bare JSON number, which is
///   what the upstream order API and the browser cart expect
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from smallest-unit amount.
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Rounds a fractional amount to the nearest unit, halves rounding up.
    ///
    /// Non-finite input (NaN, infinities) becomes zero so arithmetic on
    /// malformed upstream data never panics.
    ///
    /// ```rust
    /// use meja_core::money::Money;
    ///
    /// assert_eq!(Money::round_from(1818.5).amount(), 1819);
    /// assert_eq!(Money::round_from(-0.5).amount(), 0);
    /// assert_eq!(Money::round_from(f64::NAN).amount(), 0);
    /// ```
    pub fn round_from(value: f64) -> Self {
        if !value.is_finite() {
            return Money::zero();
        }
        Money((value + 0.5).floor() as i64)
    }

    /// Returns `percentage`% of this amount, rounded half up.
    ///
    /// ## Implementation
    /// The percentage is converted to basis points first so that the usual
    /// rates (10, 11, 2.5) go through pure integer math:
    /// `(amount * bps + 5000) / 10000`, the +5000 providing the half-up step.
    ///
    /// ```rust
    /// use meja_core::money::Money;
    ///
    /// assert_eq!(Money::new(10_000).percent(11.0).amount(), 1_100);
    /// assert_eq!(Money::new(1_005).percent(10.0).amount(), 101);
    /// ```
    pub fn percent(&self, percentage: f64) -> Money {
        if !percentage.is_finite() {
            return Money::zero();
        }
        let bps = ((percentage * 100.0).round() as i64) as i128;
        let scaled = (self.0 as i128 * bps + 5000).div_euclid(10_000);
        Money(scaled.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Rounds to the nearest multiple of `unit`, halves rounding up.
    ///
    /// ```rust
    /// use meja_core::money::Money;
    ///
    /// assert_eq!(Money::new(39_650).round_to_nearest(100).amount(), 39_700);
    /// assert_eq!(Money::new(39_649).round_to_nearest(100).amount(), 39_600);
    /// ```
    pub fn round_to_nearest(&self, unit: i64) -> Money {
        if unit <= 0 {
            return *self;
        }
        Money(
            self.0
                .saturating_add(unit / 2)
                .div_euclid(unit)
                .saturating_mul(unit),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Arithmetic saturates: amounts derived from untrusted quantities and prices
// must never panic.

/// Renders as `Rp 39.600` (dot as thousands separator). For logs only; the
/// SPA formats amounts itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, grouped)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::new(39_600).to_string(), "Rp 39.600");
        assert_eq!(Money::new(1_234_567).to_string(), "Rp 1.234.567");
        assert_eq!(Money::new(500).to_string(), "Rp 500");
        assert_eq!(Money::new(-50).to_string(), "-Rp 50");
        assert_eq!(Money::zero().to_string(), "Rp 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::new(1000);
        let b = Money::new(500);

        assert_eq!((a + b).amount(), 1500);
        assert_eq!((a - b).amount(), 500);
        assert_eq!((a * 3).amount(), 3000);
        assert_eq!((-a).amount(), -1000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.amount(), 2000);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(Money::new(36_000).percent(10.0).amount(), 3_600);
        // 12_345 × 11% = 1357.95
        assert_eq!(Money::new(12_345).percent(11.0).amount(), 1_358);
        // 25 × 10% = 2.5
        assert_eq!(Money::new(25).percent(10.0).amount(), 3);
        // fractional rate
        assert_eq!(Money::new(10_000).percent(2.5).amount(), 250);
        assert_eq!(Money::new(10_000).percent(f64::NAN).amount(), 0);
    }

    #[test]
    fn test_round_to_nearest_hundred() {
        assert_eq!(Money::new(21_100).round_to_nearest(100).amount(), 21_100);
        assert_eq!(Money::new(21_150).round_to_nearest(100).amount(), 21_200);
        assert_eq!(Money::new(50).round_to_nearest(100).amount(), 100);
        assert_eq!(Money::new(49).round_to_nearest(100).amount(), 0);
        // Halves go up even below zero, like Math.round.
        assert_eq!(Money::new(-150).round_to_nearest(100).amount(), -100);
    }

    #[test]
    fn test_round_from_float() {
        assert_eq!(Money::round_from(1099.49).amount(), 1099);
        assert_eq!(Money::round_from(1099.5).amount(), 1100);
        assert_eq!(Money::round_from(f64::INFINITY).amount(), 0);
    }

    #[test]
    fn test_extreme_values_saturate() {
        let max = Money::new(i64::MAX);
        assert_eq!((max * 1_000_000).amount(), i64::MAX);
        assert_eq!((Money::new(i64::MIN) * 2).amount(), i64::MIN);
        assert_eq!((max + Money::new(1)).amount(), i64::MAX);
        assert_eq!((Money::new(i64::MIN) - Money::new(1)).amount(), i64::MIN);
        assert_eq!((-Money::new(i64::MIN)).amount(), i64::MAX);
        assert_eq!(max.percent(1e300).amount(), i64::MAX);
        assert_eq!(max.percent(500.0).amount(), i64::MAX);
        assert_eq!(max.round_to_nearest(100).amount() % 100, 0);
        assert_eq!(Money::round_from(1e30).amount(), i64::MAX);

        let total: Money = vec![max, max].into_iter().sum();
        assert_eq!(total.amount(), i64::MAX);
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::new(18_000)).unwrap();
        assert_eq!(json, "18000");
    }
}
