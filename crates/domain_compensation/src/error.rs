//! Compensation domain errors
//!
//! The statement calculator itself never fails; these errors cover loading
//! and validating plan and transaction documents before a calculation.

use thiserror::Error;

/// Errors that can occur while preparing a calculation
#[derive(Debug, Error)]
pub enum CompensationError {
    /// Plan document could not be parsed
    #[error("Failed to parse plan: {0}")]
    PlanParse(String),

    /// Transaction batch could not be parsed
    #[error("Failed to parse transactions: {0}")]
    TransactionParse(String),

    /// Document file could not be read
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Plan parsed but is structurally unusable
    #[error("Invalid plan: {}", .issues.join("; "))]
    InvalidPlan { issues: Vec<String> },
}

impl CompensationError {
    /// Creates a plan parse error
    pub fn plan_parse(message: impl std::fmt::Display) -> Self {
        CompensationError::PlanParse(message.to_string())
    }

    /// Creates a transaction parse error
    pub fn transaction_parse(message: impl std::fmt::Display) -> Self {
        CompensationError::TransactionParse(message.to_string())
    }
}
