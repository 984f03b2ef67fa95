//! Decimal-precision monetary amounts.
//!
//! Ubiregi sends money as decimal strings (`"385.0"`). The client keeps the
//! exact text and never round-trips it through a float.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors raised when parsing an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountValidationError {
    /// The value was empty once trimmed.
    Empty,
    /// The value is not a plain decimal number.
    NotDecimal(String),
}

impl fmt::Display for AmountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "amount must not be empty"),
            Self::NotDecimal(raw) => write!(f, "amount `{raw}` is not a decimal number"),
        }
    }
}

impl std::error::Error for AmountValidationError {}

/// Monetary amount stored as its decimal string representation.
///
/// ## Invariants
/// - Matches `-?[0-9]+(\.[0-9]+)?` after trimming surrounding whitespace.
///
/// # Examples
/// ```
/// use ubiclient::domain::Amount;
///
/// let price = Amount::parse("385.0").unwrap();
/// assert_eq!(price.as_str(), "385.0");
/// assert!(Amount::parse("3.8e2").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(String);

impl Amount {
    /// Validate a decimal string.
    pub fn parse(raw: &str) -> Result<Self, AmountValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AmountValidationError::Empty);
        }
        if !is_decimal(trimmed) {
            return Err(AmountValidationError::NotDecimal(raw.to_owned()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Exact decimal text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn is_decimal(value: &str) -> bool {
    let unsigned = value.strip_prefix('-').unwrap_or(value);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    all_digits(whole) && fraction.is_none_or(all_digits)
}

impl TryFrom<String> for Amount {
    type Error = AmountValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
