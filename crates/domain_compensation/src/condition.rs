//! Condition evaluation
//!
//! Rules are gated by boolean predicate trees. Leaves name a dotted path into
//! one of three fixed namespaces (`transaction.*`, `participant.*`,
//! `metrics.*`) and compare the resolved value against a literal.
//!
//! Evaluation is total: missing data resolves to [`FieldValue::Absent`],
//! which fails every operator except `existsFlag` with `exists: false`.
//!
//! # Example
//!
//! ```rust,ignore
//! let condition = Condition::and(vec![
//!     Condition::eq("participant.role", "Producer"),
//!     Condition::gte("transaction.premiumDelta", 1000),
//! ]);
//! assert!(condition.evaluate(&EvalContext::for_participant(&tx, &participant)));
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use core_kernel::parse_iso_date;

use crate::metrics::PersonMetrics;
use crate::transaction::{Participant, Transaction};
use crate::value::FieldValue;

/// Root namespace of a field path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Transaction,
    Participant,
    Metrics,
}

/// A parsed dotted path such as `participant.fields.region`
///
/// Paths with an unrecognized root still parse; they resolve to
/// [`FieldValue::Absent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    raw: String,
    namespace: Option<Namespace>,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.trim().split('.');
        let namespace = match parts.next() {
            Some("transaction") => Some(Namespace::Transaction),
            Some("participant") => Some(Namespace::Participant),
            Some("metrics") => Some(Namespace::Metrics),
            _ => None,
        };
        Self {
            raw: raw.to_string(),
            namespace,
            segments: parts.filter(|s| !s.is_empty()).map(str::to_string).collect(),
        }
    }

    /// Returns the root namespace, if recognized
    pub fn namespace(&self) -> Option<Namespace> {
        self.namespace
    }

    /// Returns the path segments after the root
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<String> for FieldPath {
    fn from(raw: String) -> Self {
        FieldPath::parse(&raw)
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        FieldPath::parse(raw)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> String {
        path.raw
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// The records a condition can see
///
/// Transaction-stage rules see the transaction (and the participant when
/// evaluated per participant); period-stage rules see only metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvalContext<'a> {
    pub transaction: Option<&'a Transaction>,
    pub participant: Option<&'a Participant>,
    pub metrics: Option<&'a PersonMetrics>,
}

impl<'a> EvalContext<'a> {
    pub fn for_transaction(transaction: &'a Transaction) -> Self {
        Self { transaction: Some(transaction), ..Self::default() }
    }

    pub fn for_participant(transaction: &'a Transaction, participant: &'a Participant) -> Self {
        Self {
            transaction: Some(transaction),
            participant: Some(participant),
            metrics: None,
        }
    }

    pub fn for_metrics(metrics: &'a PersonMetrics) -> Self {
        Self { metrics: Some(metrics), ..Self::default() }
    }

    /// Resolves a path against the records in scope
    pub fn resolve(&self, path: &FieldPath) -> FieldValue {
        let segments = path.segments();
        match path.namespace() {
            Some(Namespace::Transaction) => self.transaction.map_or(FieldValue::Absent, |t| t.field(segments)),
            Some(Namespace::Participant) => self.participant.map_or(FieldValue::Absent, |p| p.field(segments)),
            Some(Namespace::Metrics) => self.metrics.map_or(FieldValue::Absent, |m| m.field(segments)),
            None => FieldValue::Absent,
        }
    }
}

/// A boolean predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Condition {
    And { conditions: Vec<Condition> },
    Or { conditions: Vec<Condition> },
    Eq { field: FieldPath, #[serde(default)] value: FieldValue },
    Neq { field: FieldPath, #[serde(default)] value: FieldValue },
    Gt { field: FieldPath, #[serde(default)] value: FieldValue },
    Gte { field: FieldPath, #[serde(default)] value: FieldValue },
    Lt { field: FieldPath, #[serde(default)] value: FieldValue },
    Lte { field: FieldPath, #[serde(default)] value: FieldValue },
    In { field: FieldPath, #[serde(default)] value: FieldValue },
    Contains { field: FieldPath, #[serde(default)] value: FieldValue },
    StartsWith { field: FieldPath, #[serde(default)] value: FieldValue },
    EndsWith { field: FieldPath, #[serde(default)] value: FieldValue },
    ExistsFlag {
        field: FieldPath,
        #[serde(default = "default_exists")]
        exists: bool,
    },
    BetweenDates { field: FieldPath, start: String, end: String },
}

fn default_exists() -> bool {
    true
}

impl Condition {
    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    pub fn eq(field: &str, value: impl Into<FieldValue>) -> Self {
        Condition::Eq { field: field.into(), value: value.into() }
    }

    pub fn neq(field: &str, value: impl Into<FieldValue>) -> Self {
        Condition::Neq { field: field.into(), value: value.into() }
    }

    pub fn gte(field: &str, value: impl Into<FieldValue>) -> Self {
        Condition::Gte { field: field.into(), value: value.into() }
    }

    pub fn lt(field: &str, value: impl Into<FieldValue>) -> Self {
        Condition::Lt { field: field.into(), value: value.into() }
    }

    pub fn exists(field: &str, exists: bool) -> Self {
        Condition::ExistsFlag { field: field.into(), exists }
    }

    /// Evaluates the condition; never fails
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Condition::And { conditions } => conditions.iter().all(|c| c.evaluate(ctx)),
            Condition::Or { conditions } => conditions.iter().any(|c| c.evaluate(ctx)),
            Condition::Eq { field, value } => {
                let actual = ctx.resolve(field);
                actual.is_defined() && actual == *value
            }
            Condition::Neq { field, value } => {
                let actual = ctx.resolve(field);
                actual.is_defined() && actual != *value
            }
            Condition::Gt { field, value } => compare(&ctx.resolve(field), value, |o| o == Ordering::Greater),
            Condition::Gte { field, value } => compare(&ctx.resolve(field), value, |o| o != Ordering::Less),
            Condition::Lt { field, value } => compare(&ctx.resolve(field), value, |o| o == Ordering::Less),
            Condition::Lte { field, value } => compare(&ctx.resolve(field), value, |o| o != Ordering::Greater),
            Condition::In { field, value } => {
                let actual = ctx.resolve(field);
                match value {
                    FieldValue::List(items) => actual.is_defined() && items.contains(&actual),
                    _ => false,
                }
            }
            Condition::Contains { field, value } => match ctx.resolve(field) {
                FieldValue::Absent => false,
                FieldValue::List(items) => items.contains(value),
                other => text_match(&other, value, |hay, needle| hay.contains(needle)),
            },
            Condition::StartsWith { field, value } => {
                text_match(&ctx.resolve(field), value, |hay, needle| hay.starts_with(needle))
            }
            Condition::EndsWith { field, value } => {
                text_match(&ctx.resolve(field), value, |hay, needle| hay.ends_with(needle))
            }
            Condition::ExistsFlag { field, exists } => ctx.resolve(field).is_defined() == *exists,
            Condition::BetweenDates { field, start, end } => {
                let date = ctx.resolve(field).as_text().and_then(|s| parse_iso_date(&s));
                match (date, parse_iso_date(start), parse_iso_date(end)) {
                    (Some(date), Some(start), Some(end)) => start <= date && date <= end,
                    _ => false,
                }
            }
        }
    }
}

/// Numeric comparison; false unless both sides coerce to numbers
fn compare(actual: &FieldValue, expected: &FieldValue, accept: impl Fn(Ordering) -> bool) -> bool {
    match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => accept(a.cmp(&b)),
        _ => false,
    }
}

/// Case-insensitive string predicate; false unless both sides coerce to text
fn text_match(actual: &FieldValue, expected: &FieldValue, accept: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_text(), expected.as_text()) {
        (Some(hay), Some(needle)) => accept(&hay.to_lowercase(), &needle.to_lowercase()),
        _ => false,
    }
}
