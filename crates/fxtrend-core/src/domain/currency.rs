use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// ISO 4217 style currency code, normalized to uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse and normalize a currency code to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = input.trim().to_ascii_uppercase();
        let is_valid =
            normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

        if !is_valid {
            return Err(ValidationError::InvalidCurrency {
                value: input.to_owned(),
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Built-in defaults only; `code` must already be a valid uppercase code.
    pub(crate) fn known(code: &'static str) -> Self {
        debug_assert!(Self::parse(code).is_ok_and(|parsed| parsed.0 == code));
        Self(code.to_owned())
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

/// The two base currencies compared side by side.
///
/// `first` drives the date order of the aligned series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCurrencyPair")]
pub struct CurrencyPair {
    first: CurrencyCode,
    second: CurrencyCode,
}

#[derive(Deserialize)]
struct RawCurrencyPair {
    first: CurrencyCode,
    second: CurrencyCode,
}

impl TryFrom<RawCurrencyPair> for CurrencyPair {
    type Error = ValidationError;

    fn try_from(value: RawCurrencyPair) -> Result<Self, Self::Error> {
        Self::new(value.first, value.second)
    }
}

impl CurrencyPair {
    pub fn new(first: CurrencyCode, second: CurrencyCode) -> Result<Self, ValidationError> {
        if first == second {
            return Err(ValidationError::DuplicateCurrency {
                code: first.into(),
            });
        }

        Ok(Self { first, second })
    }

    pub(crate) fn known(first: &'static str, second: &'static str) -> Self {
        debug_assert_ne!(first, second);
        Self {
            first: CurrencyCode::known(first),
            second: CurrencyCode::known(second),
        }
    }

    pub fn parse(first: &str, second: &str) -> Result<Self, ValidationError> {
        Self::new(CurrencyCode::parse(first)?, CurrencyCode::parse(second)?)
    }

    pub fn first(&self) -> &CurrencyCode {
        &self.first
    }

    pub fn second(&self) -> &CurrencyCode {
        &self.second
    }
}

impl Display for CurrencyPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}
