//! # Money Module
//!
//! Provides the `Money` and `Percent` types for handling monetary values
//! and discount/tax rates safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Points                             │
//! │    $200.00 = 20000 cents, 10% = 1000 bps                                │
//! │    20000 × (10000 − 1000) / 10000 = 18000 cents  ✓ EXACT                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::{Money, Percent};
//!
//! let total = Money::from_cents(20000);          // $200.00
//! let discount = Percent::from_f64(10.0);        // 10%
//!
//! let final_amount = total.apply_discount(discount);
//! assert_eq!(final_amount.cents(), 18000);       // $180.00
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Percent
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (typical cashier discount)
/// 2100 bps = 21% (VAT)
///
/// The API boundary accepts decimal percentages; they are converted once
/// and all arithmetic stays in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a decimal value (10.0 = 10%).
    pub fn from_f64(pct: f64) -> Self {
        Percent((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a decimal percentage (for display only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// Checks whether the rate lies in the closed range [0%, 100%].
    ///
    /// Discount and tax percentages must never exceed the whole.
    #[inline]
    pub const fn is_within_whole(&self) -> bool {
        self.0 <= 10000
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for differences and reversals
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Returns `rate` percent of this amount, rounded half-up.
    ///
    /// ## Implementation
    /// Integer math in i128 to prevent overflow on large amounts:
    /// `(cents × bps + 5000) / 10000`
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::{Money, Percent};
    ///
    /// let final_amount = Money::from_cents(18000); // $180.00
    /// let vat = Percent::from_f64(21.0);
    ///
    /// assert_eq!(final_amount.percent_of(vat).cents(), 3780); // $37.80
    /// ```
    pub fn percent_of(&self, rate: Percent) -> Money {
        let cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(cents as i64)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// `total × (1 − pct/100)` computed as a single integer expression so
    /// the result matches the complement exactly.
    ///
    /// ## Example
    /// ```rust
    /// use caja_core::money::{Money, Percent};
    ///
    /// let subtotal = Money::from_cents(10000);               // $100.00
    /// let discounted = subtotal.apply_discount(Percent::from_bps(1000));
    /// assert_eq!(discounted.cents(), 9000);                  // $90.00
    /// ```
    pub fn apply_discount(&self, discount: Percent) -> Money {
        let keep_bps = 10000i128 - discount.bps() as i128;
        let cents = (self.0 as i128 * keep_bps + 5000) / 10000;
        Money::from_cents(cents as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logging and debugging. The frontend owns display formatting
/// to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
    }

    #[test]
    fn test_percent_from_f64() {
        assert_eq!(Percent::from_f64(10.0).bps(), 1000);
        assert_eq!(Percent::from_f64(21.0).bps(), 2100);
        assert_eq!(Percent::from_f64(8.25).bps(), 825);
    }

    #[test]
    fn test_percent_within_whole() {
        assert!(Percent::from_bps(0).is_within_whole());
        assert!(Percent::from_bps(10000).is_within_whole());
        assert!(!Percent::from_bps(10001).is_within_whole());
    }

    #[test]
    fn test_apply_discount_exact() {
        // $200.00 at 10% off = $180.00, exactly
        let total = Money::from_cents(20000);
        let discounted = total.apply_discount(Percent::from_f64(10.0));
        assert_eq!(discounted.cents(), 18000);
    }

    #[test]
    fn test_apply_discount_bounds() {
        let total = Money::from_cents(12345);
        assert_eq!(total.apply_discount(Percent::zero()).cents(), 12345);
        assert_eq!(total.apply_discount(Percent::from_bps(10000)).cents(), 0);
    }

    #[test]
    fn test_percent_of_tax() {
        // 21% of $180.00 = $37.80
        let final_amount = Money::from_cents(18000);
        let tax = final_amount.percent_of(Percent::from_f64(21.0));
        assert_eq!(tax.cents(), 3780);
    }

    #[test]
    fn test_percent_of_rounds_half_up() {
        // 8.25% of $10.00 = $0.825 → rounds to $0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.percent_of(Percent::from_bps(825)).cents(), 83);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    }
}
