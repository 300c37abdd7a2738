//! Generic field values for condition lookups
//!
//! Custom fields on transactions and participants are free-form JSON. They
//! are held as `FieldValue` so that conditions can compare against them
//! without reflecting over arbitrary structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use core_kernel::money::lenient;

/// A dynamically typed value resolved from a dotted path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum FieldValue {
    /// The path did not resolve to anything
    #[default]
    Absent,
    Bool(bool),
    Number(Decimal),
    Text(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Returns true if the value is present
    pub fn is_defined(&self) -> bool {
        !matches!(self, FieldValue::Absent)
    }

    /// Coerces the value to a number
    ///
    /// Numeric text is parsed and booleans map to 1/0. Lists, maps and
    /// absent values never coerce.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => lenient::parse_decimal(s),
            FieldValue::Bool(b) => Some(if *b { Decimal::ONE } else { Decimal::ZERO }),
            FieldValue::Absent | FieldValue::List(_) | FieldValue::Map(_) => None,
        }
    }

    /// Coerces the value to a string
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.normalize().to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Absent | FieldValue::List(_) | FieldValue::Map(_) => None,
        }
    }

    /// Walks nested maps along the remaining path segments
    pub fn lookup(&self, segments: &[String]) -> FieldValue {
        match segments.split_first() {
            None => self.clone(),
            Some((head, rest)) => match self {
                FieldValue::Map(map) => map.get(head).map_or(FieldValue::Absent, |v| v.lookup(rest)),
                _ => FieldValue::Absent,
            },
        }
    }

    /// Creates a text value from an optional string
    pub fn optional_text(value: Option<&str>) -> FieldValue {
        value.map_or(FieldValue::Absent, |s| FieldValue::Text(s.to_string()))
    }
}

/// Resolves a dotted path inside a custom field map
pub fn lookup_custom(fields: &BTreeMap<String, FieldValue>, segments: &[String]) -> FieldValue {
    match segments.split_first() {
        Some((head, rest)) => fields.get(head).map_or(FieldValue::Absent, |v| v.lookup(rest)),
        None => FieldValue::Absent,
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Absent,
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Number(n) => lenient::parse_decimal(&n.to_string())
                .map_or(FieldValue::Absent, FieldValue::Number),
            Value::String(s) => FieldValue::Text(s),
            Value::Array(items) => FieldValue::List(items.into_iter().map(FieldValue::from).collect()),
            Value::Object(map) => FieldValue::Map(
                map.into_iter().map(|(k, v)| (k, FieldValue::from(v))).collect(),
            ),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Absent => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Number(n) => {
                let text = n.normalize().to_string();
                text.parse::<serde_json::Number>()
                    .map(Value::Number)
                    .unwrap_or(Value::String(text))
            }
            FieldValue::Text(s) => Value::String(s),
            FieldValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            FieldValue::Map(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(Decimal::from(value))
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Number(Decimal::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}
