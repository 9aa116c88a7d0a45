use std::{fmt, iter::Sum, ops::Add};

use crate::EngineError;

/// Largest amount accepted from decimal input, in reais.
const MAX_MAJOR: f64 = 1_000_000_000_000.0;

/// Money amount in Brazilian reais represented as **integer centavos**.
///
/// Every monetary column (subtotal, discount amount, final amount) is stored
/// as centavos so that totals and averages never drift.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(90_000);
/// assert_eq!(amount.cents(), 90000);
/// assert_eq!(amount.to_string(), "R$ 900.00");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer centavos.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in centavos.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Converts a decimal amount in reais (as received on the wire) into
    /// centavos, rounding half away from zero.
    pub fn try_from_major(value: f64) -> Result<Self, EngineError> {
        if !value.is_finite() {
            return Err(EngineError::InvalidAmount("amount must be a number".to_string()));
        }
        if value.abs() > MAX_MAJOR {
            return Err(EngineError::InvalidAmount("amount too large".to_string()));
        }
        Ok(Self((value * 100.0).round() as i64))
    }

    /// Returns the amount in reais, for wire formats that carry decimals.
    #[must_use]
    pub fn to_major(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Integer division used for averages; `None` when `count` is zero.
    #[must_use]
    pub fn checked_div(self, count: i64) -> Option<MoneyCents> {
        self.0.checked_div(count).map(MoneyCents)
    }

    /// Formats the amount without the currency symbol (`900.00`).
    #[must_use]
    pub fn plain(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R$ {}", self.plain())
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_brl() {
        assert_eq!(MoneyCents::new(0).to_string(), "R$ 0.00");
        assert_eq!(MoneyCents::new(5).to_string(), "R$ 0.05");
        assert_eq!(MoneyCents::new(90_000).to_string(), "R$ 900.00");
        assert_eq!(MoneyCents::new(-1050).to_string(), "R$ -10.50");
    }

    #[test]
    fn major_conversion_rounds_to_centavos() {
        assert_eq!(MoneyCents::try_from_major(1000.0).unwrap().cents(), 100_000);
        assert_eq!(MoneyCents::try_from_major(0.1 + 0.2).unwrap().cents(), 30);
        assert_eq!(MoneyCents::try_from_major(19.999).unwrap().cents(), 2000);
        assert!(MoneyCents::try_from_major(f64::NAN).is_err());
        assert!((MoneyCents::new(90_000).to_major() - 900.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_guards_zero_count() {
        assert_eq!(MoneyCents::new(1000).checked_div(0), None);
        assert_eq!(MoneyCents::new(1000).checked_div(4), Some(MoneyCents::new(250)));
    }
}
