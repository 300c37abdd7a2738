//! Core Kernel - Foundational types and utilities for commission statements
//!
//! This crate provides the fundamental building blocks used by the
//! compensation engine and its interfaces:
//! - Cent rounding and lenient numeric ingestion over `rust_decimal`
//! - Calculation period keys and ISO date parsing
//! - String-backed identifiers for reps, rules, plans and transactions

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{CurrencyCode, round_cents, add_cents, CENT_PLACES};
pub use temporal::{PeriodKey, TemporalError, parse_iso_date};
pub use identifiers::{RepId, RuleId, PlanId, TransactionId, PolicyId};
pub use error::CoreError;
