//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! compensation engine test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built rules, transactions, and plan documents
//! - `builders`: Builder patterns for test data construction
//! - `assertions`: Custom assertion helpers for statements and traces
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
