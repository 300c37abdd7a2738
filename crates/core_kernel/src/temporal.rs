//! Calculation periods and date parsing
//!
//! Statements are computed for one calendar month at a time, identified by
//! a `YYYY-MM` period key, or across every transaction with the `ALL` key.
//! Transaction dates arrive as loosely formatted ISO strings, so parsing
//! here never fails hard: unparsable input simply yields `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period key: {0} (expected YYYY-MM or ALL)")]
    InvalidPeriodKey(String),
}

/// Identifies which calculation period a statement covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    /// A single calendar month
    Month { year: i32, month: u32 },
    /// No period filtering
    All,
}

impl PeriodKey {
    /// Literal used for the unfiltered period
    pub const ALL: &'static str = "ALL";

    /// Creates a month key, validating the month number
    pub fn month(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(TemporalError::InvalidPeriodKey(format!("{:04}-{:02}", year, month)));
        }
        Ok(PeriodKey::Month { year, month })
    }

    /// Derives the month key from the `YYYY-MM` prefix of a date string
    ///
    /// Only the leading slice is inspected, so full dates and timestamps
    /// both work. Returns `None` if the prefix is not a valid year-month.
    pub fn from_date_str(date: &str) -> Option<Self> {
        let prefix = date.trim().get(..7)?;
        prefix.parse::<PeriodKey>().ok().filter(|key| !key.is_all())
    }

    /// Returns true for the unfiltered period
    pub fn is_all(&self) -> bool {
        matches!(self, PeriodKey::All)
    }

    /// Returns true if a date string falls inside this period
    ///
    /// The `ALL` period contains everything, including missing dates.
    pub fn contains(&self, date: Option<&str>) -> bool {
        match self {
            PeriodKey::All => true,
            PeriodKey::Month { .. } => date.and_then(PeriodKey::from_date_str) == Some(*self),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(Self::ALL) {
            return Ok(PeriodKey::All);
        }

        let invalid = || TemporalError::InvalidPeriodKey(s.to_string());
        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        PeriodKey::month(year, month).map_err(|_| invalid())
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            PeriodKey::All => write!(f, "{}", Self::ALL),
        }
    }
}

impl Serialize for PeriodKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PeriodKey::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Parses an ISO-8601 date or timestamp into a calendar date
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, and naive `YYYY-MM-DDTHH:MM:SS`
/// timestamps. Returns `None` for anything else.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}
