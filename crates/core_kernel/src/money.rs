//! Money helpers with precise decimal arithmetic
//!
//! Payouts are plain `Decimal` amounts in the plan currency. Every running
//! total is rounded to cents immediately after each addition, so this module
//! owns the one rounding rule the whole workspace uses.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of decimal places kept on every monetary running total
pub const CENT_PLACES: u32 = 2;

/// Rounds an amount to the nearest cent (midpoint away from zero)
///
/// The result always carries exactly two decimal places so that serialized
/// statements are byte-stable across runs.
pub fn round_cents(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(CENT_PLACES);
    rounded
}

/// Adds a delta to a running total and rounds the result to cents
///
/// Saturates at the representable range instead of overflowing.
pub fn add_cents(total: Decimal, delta: Decimal) -> Decimal {
    round_cents(total.saturating_add(delta))
}

/// ISO 4217 currency code carried through from the plan to the statement
///
/// The engine never converts between currencies, so any code is accepted;
/// it is only normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, trimming and upper-casing the input
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Returns the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the display symbol for common codes, or the code itself
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            "INR" => "₹",
            "AUD" => "A$",
            "CAD" => "C$",
            other => other,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl From<String> for CurrencyCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for CurrencyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> String {
        code.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lenient numeric ingestion for externally authored documents
///
/// Plans and transactions come from paste/import tools, so numeric fields
/// may arrive as JSON numbers, numeric strings, or garbage. Garbage coerces
/// to zero instead of failing the whole document.
pub mod lenient {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    /// Parses a numeric string, accepting plain and scientific notation
    pub fn parse_decimal(text: &str) -> Option<Decimal> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
    }

    /// Coerces a JSON value to a decimal, if it holds a number
    pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
        match value {
            Value::Number(n) => parse_decimal(&n.to_string()),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// Deserializes a required numeric field, coercing invalid input to zero
    pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(coerce_decimal(&value).unwrap_or(Decimal::ZERO))
    }

    /// Deserializes an optional numeric field
    ///
    /// `null` stays `None`; a present but invalid value coerces to zero.
    pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Null => None,
            other => Some(coerce_decimal(&other).unwrap_or(Decimal::ZERO)),
        })
    }
}
