//! Non-negative monetary amounts.
//!
//! Amounts are held in the smallest currency unit (cents) so that totals are
//! exact. Two `Money` values with the same amount are equal; there is no
//! identity and no currency (pricing/tax logic is out of scope).

use core::iter::Sum;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Amount in cents.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Whole currency units (e.g. `Money::from_major(5)` is 5.00).
    pub const fn from_major(units: u64) -> Self {
        Self(units.saturating_mul(100))
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Line total for `quantity` units at this price.
    pub fn times(self, quantity: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(quantity)))
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = DomainError;

    /// Parses decimal text such as `12`, `12.5` or `12.50`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || DomainError::validation(format!("invalid amount: {s:?}"));

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || frac.len() > 2 {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: u64 = whole.parse().map_err(|_| invalid())?;
        let cents: u64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Money)
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_text() {
        assert_eq!("5".parse::<Money>().unwrap(), Money::from_cents(500));
        assert_eq!("5.5".parse::<Money>().unwrap(), Money::from_cents(550));
        assert_eq!("0.07".parse::<Money>().unwrap(), Money::from_cents(7));
        assert!("-1".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!(".5".parse::<Money>().is_err());
    }

    #[test]
    fn totals_sum_line_amounts() {
        let total: Money = [Money::from_major(2).times(3), Money::from_cents(50).times(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_cents(650));
        assert_eq!(total.to_string(), "6.50");
    }
}
