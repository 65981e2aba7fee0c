//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Float totals drift, and cash drawers get reconciled against them.     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    100.00 EGP = 10000 piasters, always exact                            │
//! │    Rates are basis points (1400 = 14%), applied with explicit rounding  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use velva_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_cents(2500); // 25.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;                     // 50.00
//! let total = price + Money::from_cents(500);  // 30.00
//!
//! // Parse user input at the UI boundary
//! let cash = Money::parse("200").unwrap();
//! assert_eq!(cash.cents(), 20000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Rate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit
/// (piasters for EGP, cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for discounts exceeding subtotal
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use velva_core::money::Money;
    ///
    /// let price = Money::from_cents(2500); // 25.00
    /// assert_eq!(price.cents(), 2500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Parses a decimal string ("200", "12.5", "12.34", "-3.00") into Money.
    ///
    /// This is the ONLY bridge from user-typed text to Money. Cash drawer
    /// counts and discounts enter the system through it, so garbage
    /// ("NaN", "", "1.2.3") and more than two decimals are rejected as
    /// validation errors rather than silently truncated.
    ///
    /// ## Example
    /// ```rust
    /// use velva_core::money::Money;
    ///
    /// assert_eq!(Money::parse("200").unwrap().cents(), 20000);
    /// assert_eq!(Money::parse("12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse("-3.07").unwrap().cents(), -307);
    /// assert!(Money::parse("NaN").is_err());
    /// assert!(Money::parse("1.234").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        let invalid = || ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: "must be a decimal number with at most 2 decimal places".to_string(),
        };

        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((m, f)) => (m, f),
            None => (digits, ""),
        };

        if major_str.is_empty() && minor_str.is_empty() {
            return Err(invalid());
        }
        if minor_str.len() > 2 {
            return Err(invalid());
        }
        if !major_str.chars().all(|c| c.is_ascii_digit())
            || !minor_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let major: i64 = if major_str.is_empty() {
            0
        } else {
            major_str.parse().map_err(|_| invalid())?
        };
        // "12.5" means 50 minor units, not 5
        let minor: i64 = if minor_str.is_empty() {
            0
        } else {
            let padded = format!("{:0<2}", minor_str);
            padded.parse().map_err(|_| invalid())?
        };

        let cents = major * 100 + minor;
        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Applies a percentage rate (service charge, tax) to this amount.
    ///
    /// ## Rounding
    /// Rounds half away from zero. Symmetric rounding matters because a
    /// discount larger than the subtotal drives the base negative, and a
    /// negative service charge must mirror the positive case exactly.
    ///
    /// ## Example
    /// ```rust
    /// use velva_core::money::Money;
    /// use velva_core::types::Rate;
    ///
    /// let base = Money::from_cents(10000);        // 100.00
    /// let service = base.apply_rate(Rate::from_bps(1200)); // 12%
    /// assert_eq!(service.cents(), 1200);          // 12.00
    ///
    /// let negative = Money::from_cents(-10000);
    /// assert_eq!(negative.apply_rate(Rate::from_bps(1200)).cents(), -1200);
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Money {
        // i128 to prevent overflow on large amounts
        let scaled = self.0 as i128 * rate.bps() as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money::from_cents(rounded as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use velva_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(3500); // 35.00 latte
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 10500);    // 105.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money as a plain decimal ("12.34").
///
/// The currency symbol lives in `CafeSettings`; formatting with a symbol
/// is the display layer's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_units().abs(), self.cents_part())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (cart subtotals, cash payments).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
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
        let money = Money::from_cents(2599);
        assert_eq!(money.cents(), 2599);
        assert_eq!(money.major_units(), 25);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(25, 50).cents(), 2550);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(2599)), "25.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, 49]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 399);
    }

    #[test]
    fn test_parse_whole_and_decimal() {
        assert_eq!(Money::parse("200").unwrap().cents(), 20000);
        assert_eq!(Money::parse("12.34").unwrap().cents(), 1234);
        assert_eq!(Money::parse("12.5").unwrap().cents(), 1250);
        assert_eq!(Money::parse(".50").unwrap().cents(), 50);
        assert_eq!(Money::parse("-3.07").unwrap().cents(), -307);
        assert_eq!(Money::parse(" 7 ").unwrap().cents(), 700);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("NaN").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.234").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("1e3").is_err());
    }

    #[test]
    fn test_apply_rate_basic() {
        // 100.00 at 12% = 12.00
        let amount = Money::from_cents(10000);
        assert_eq!(amount.apply_rate(Rate::from_bps(1200)).cents(), 1200);
    }

    #[test]
    fn test_apply_rate_with_rounding() {
        // 10.00 at 8.25% = 0.825 → 0.83
        let amount = Money::from_cents(1000);
        assert_eq!(amount.apply_rate(Rate::from_bps(825)).cents(), 83);
    }

    #[test]
    fn test_apply_rate_negative_base_is_symmetric() {
        let rate = Rate::from_bps(825);
        let positive = Money::from_cents(1000).apply_rate(rate);
        let negative = Money::from_cents(-1000).apply_rate(rate);
        assert_eq!(positive.cents(), 83);
        assert_eq!(negative.cents(), -83);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        assert!(Money::from_cents(100).is_positive());
        assert!(Money::from_cents(-100).is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(4500);
        assert_eq!(unit_price.multiply_quantity(2).cents(), 9000);
    }
}
