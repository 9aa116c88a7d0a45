//! Human readable budget numbers: `YYYY-NNN`, unique per tenant and year.
//!
//! The sequence part is zero padded to three digits but is not a fixed width
//! field: the thousandth budget of 2026 is `2026-1000`.

use std::{fmt, str::FromStr};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BudgetNumber {
    year: i32,
    sequence: u32,
}

impl BudgetNumber {
    pub fn new(year: i32, sequence: u32) -> Result<Self, EngineError> {
        if !(1000..=9999).contains(&year) {
            return Err(EngineError::InvalidNumber(format!("year out of range: {year}")));
        }
        if sequence == 0 {
            return Err(EngineError::InvalidNumber("sequence starts at 1".to_string()));
        }
        Ok(Self { year, sequence })
    }

    /// First number of a year.
    pub fn first(year: i32) -> Result<Self, EngineError> {
        Self::new(year, 1)
    }

    /// Number following `last` in `year`; the first one if the year has none.
    pub fn next_after(year: i32, last: Option<&BudgetNumber>) -> Result<Self, EngineError> {
        match last {
            Some(last) if last.year == year => {
                let sequence = last.sequence.checked_add(1).ok_or_else(|| {
                    EngineError::InvalidNumber(format!("sequence exhausted for {year}"))
                })?;
                Self::new(year, sequence)
            }
            Some(last) => Err(EngineError::InvalidNumber(format!(
                "{last} does not belong to {year}"
            ))),
            None => Self::first(year),
        }
    }

    /// `LIKE` prefix selecting every number of `year`.
    pub fn year_prefix(year: i32) -> String {
        format!("{year}-")
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for BudgetNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:03}", self.year, self.sequence)
    }
}

impl FromStr for BudgetNumber {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidNumber(s.to_string());
        let (year, sequence) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || sequence.len() < 3 {
            return Err(invalid());
        }
        if !year.bytes().all(|b| b.is_ascii_digit()) || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let sequence = sequence.parse().map_err(|_| invalid())?;
        Self::new(year, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_three_digit_padding() {
        assert_eq!(BudgetNumber::new(2026, 1).unwrap().to_string(), "2026-001");
        assert_eq!(BudgetNumber::new(2026, 42).unwrap().to_string(), "2026-042");
        assert_eq!(BudgetNumber::new(2026, 1000).unwrap().to_string(), "2026-1000");
    }

    #[test]
    fn next_after_increments_or_starts_over() {
        let last: BudgetNumber = "2026-041".parse().unwrap();
        assert_eq!(
            BudgetNumber::next_after(2026, Some(&last)).unwrap().to_string(),
            "2026-042"
        );
        let last: BudgetNumber = "2026-999".parse().unwrap();
        assert_eq!(
            BudgetNumber::next_after(2026, Some(&last)).unwrap().to_string(),
            "2026-1000"
        );
        assert_eq!(BudgetNumber::next_after(2027, None).unwrap().to_string(), "2027-001");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("2026-01".parse::<BudgetNumber>().is_err());
        assert!("26-001".parse::<BudgetNumber>().is_err());
        assert!("2026-0a1".parse::<BudgetNumber>().is_err());
        assert!("2026-000".parse::<BudgetNumber>().is_err());
        assert!("2026001".parse::<BudgetNumber>().is_err());
    }

    #[test]
    fn ordering_is_numeric() {
        let a: BudgetNumber = "2026-999".parse().unwrap();
        let b: BudgetNumber = "2026-1000".parse().unwrap();
        assert!(a < b);
    }
}
