//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Stock valuation sums thousands of quantity × price products:          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (centimes)                          │
//! │    Every price is an i64 count of centimes, every sum is exact         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mortar_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let price = Money::from_cents(125_050); // 1250.50
//!
//! // Or parse what the user typed in a price field
//! let typed = Money::parse("1250,50").unwrap();
//! assert_eq!(price, typed);
//!
//! let line_total = price.multiply_quantity(4);
//! assert_eq!(line_total.cents(), 500_200);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (centimes).
///
/// ## Design Decisions
/// - **i64 (signed)**: margins and purchase-cancellation valuations can go
///   negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Storage**: persisted as `*_cents` INTEGER columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use mortar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50.
    ///
    /// ## Example
    /// ```rust
    /// use mortar_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(150, 0).cents(), 15_000);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses a decimal amount typed by a user.
    ///
    /// Accepts `.` or `,` as decimal separator, at most two decimals, and
    /// ignores embedded whitespace (`"1 250,50"`). Anything else is a
    /// [`ValidationError::InvalidFormat`].
    ///
    /// ## Example
    /// ```rust
    /// use mortar_core::money::Money;
    ///
    /// assert_eq!(Money::parse("12.5").unwrap().cents(), 1250);
    /// assert_eq!(Money::parse("1 250,05").unwrap().cents(), 125_005);
    /// assert!(Money::parse("douze").is_err());
    /// assert!(Money::parse("1.999").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Money, ValidationError> {
        Money::parse_as(input, "amount")
    }

    /// Same as [`Money::parse`], reporting errors against `field`.
    pub fn parse_as(input: &str, field: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() {
            return Err(ValidationError::Required {
                field: field.to_string(),
            });
        }

        let (negative, unsigned) = match cleaned.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        let normalized = unsigned.replace(',', ".");
        let mut parts = normalized.splitn(2, '.');
        let major_part = parts.next().unwrap_or_default();
        let minor_part = parts.next().unwrap_or_default();

        if major_part.is_empty() && minor_part.is_empty() {
            return Err(invalid("not a number"));
        }
        if !major_part.chars().all(|c| c.is_ascii_digit())
            || !minor_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("not a number"));
        }
        if minor_part.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }

        let major: i64 = if major_part.is_empty() {
            0
        } else {
            major_part
                .parse()
                .map_err(|_| invalid("amount is too large"))?
        };
        let minor: i64 = match minor_part.len() {
            0 => 0,
            1 => minor_part.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            _ => minor_part.parse().map_err(|_| invalid("not a number"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use mortar_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(15_000); // 150.00 per bag
    /// assert_eq!(unit_price.multiply_quantity(4).cents(), 60_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`1250.50`, `-5.50`).
///
/// Currency symbols are a presentation concern, see the backoffice
/// `ConfigState::format_currency`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

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

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
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
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(125_050).to_string(), "1250.50");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_parse_accepts_common_inputs() {
        assert_eq!(Money::parse("150").unwrap().cents(), 15_000);
        assert_eq!(Money::parse("150.5").unwrap().cents(), 15_050);
        assert_eq!(Money::parse("150,05").unwrap().cents(), 15_005);
        assert_eq!(Money::parse(" 1 250.00 ").unwrap().cents(), 125_000);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse("12.").unwrap().cents(), 1200);
        assert_eq!(Money::parse("-3.20").unwrap().cents(), -320);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Money::parse(""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            Money::parse("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(Money::parse(".").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("1.234").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_parse_as_reports_field() {
        let err = Money::parse_as("x", "purchase price").unwrap_err();
        assert_eq!(
            err.to_string(),
            "purchase price has invalid format: not a number"
        );
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }
}
