//! National tax identifiers (CPF for individuals, CNPJ for organizations).
//!
//! Both use two trailing check digits computed from weighted sums modulo 11.
//! Input may carry the usual separators (`.`, `-`, `/`, spaces); they are
//! stripped and only the digits are stored.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

const INDIVIDUAL_LEN: usize = 11;
const ORGANIZATION_LEN: usize = 14;
const ORGANIZATION_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// Declared kind of a customer, selecting the tax id algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Individual,
    Organization,
}

impl PersonType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Organization => "organization",
        }
    }

    /// Label printed next to the tax id on documents.
    pub fn tax_id_label(self) -> &'static str {
        match self {
            Self::Individual => "CPF",
            Self::Organization => "CNPJ",
        }
    }
}

impl TryFrom<&str> for PersonType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "individual" => Ok(Self::Individual),
            "organization" => Ok(Self::Organization),
            other => Err(EngineError::InvalidField(format!(
                "invalid person type: {other}"
            ))),
        }
    }
}

/// A tax id that passed validation for its person type. Holds digits only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaxId {
    digits: String,
    person_type: PersonType,
}

impl TaxId {
    /// Strips separators and validates the check digits for `person_type`.
    pub fn parse(raw: &str, person_type: PersonType) -> ResultEngine<Self> {
        let digits = strip_separators(raw)
            .ok_or_else(|| EngineError::InvalidTaxId("unexpected character".to_string()))?;

        let valid = match person_type {
            PersonType::Individual => is_valid_individual(&digits),
            PersonType::Organization => is_valid_organization(&digits),
        };
        if !valid {
            return Err(EngineError::InvalidTaxId(format!(
                "{} check digits do not match",
                person_type.tax_id_label()
            )));
        }

        Ok(Self {
            digits,
            person_type,
        })
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn person_type(&self) -> PersonType {
        self.person_type
    }
}

impl fmt::Display for TaxId {
    /// Formats with the conventional masks (`111.444.777-35`,
    /// `11.222.333/0001-81`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.digits;
        match self.person_type {
            PersonType::Individual => {
                write!(f, "{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
            }
            PersonType::Organization => write!(
                f,
                "{}.{}.{}/{}-{}",
                &d[0..2],
                &d[2..5],
                &d[5..8],
                &d[8..12],
                &d[12..14]
            ),
        }
    }
}

/// Returns the digits of `raw`, or `None` if it holds anything other than
/// digits and separators.
fn strip_separators(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '0'..='9' => out.push(c),
            '.' | '-' | '/' | ' ' => {}
            _ => return None,
        }
    }
    Some(out)
}

fn to_digits(value: &str) -> Vec<u32> {
    value.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(digits: &[u32]) -> bool {
    digits.windows(2).all(|w| w[0] == w[1])
}

/// CPF check: weights 10..2 then 11..2, `(sum * 10) % 11`, 10 maps to 0.
pub fn is_valid_individual(value: &str) -> bool {
    let digits = to_digits(value);
    if digits.len() != INDIVIDUAL_LEN || value.len() != INDIVIDUAL_LEN || all_same(&digits) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let top = len as u32 + 1;
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (top - i as u32))
            .sum();
        let r = (sum * 10) % 11;
        if r == 10 { 0 } else { r }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// CNPJ check: cyclic weights 5,4,3,2,9..2 (with a leading 6 for the second
/// digit), `sum % 11` below 2 maps to 0, otherwise `11 - r`.
pub fn is_valid_organization(value: &str) -> bool {
    let digits = to_digits(value);
    if digits.len() != ORGANIZATION_LEN || value.len() != ORGANIZATION_LEN || all_same(&digits) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let weights = &ORGANIZATION_WEIGHTS[ORGANIZATION_WEIGHTS.len() - len..];
        let sum: u32 = digits[..len]
            .iter()
            .zip(weights)
            .map(|(d, w)| d * w)
            .sum();
        let r = sum % 11;
        if r < 2 { 0 } else { 11 - r }
    };

    check(12) == digits[12] && check(13) == digits[13]
}
