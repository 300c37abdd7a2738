//! Plan and transaction document loading
//!
//! Parsing happens strictly before a calculation runs. Malformed numbers
//! inside otherwise well-formed documents are coerced to zero; structural
//! problems (bad JSON, unknown rule types, missing ids) are errors.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::CompensationError;
use crate::plan::Plan;
use crate::transaction::Transaction;

/// Parses a plan from JSON and validates it
pub fn load_plan_from_str(json: &str) -> Result<Plan, CompensationError> {
    let plan: Plan = serde_json::from_str(json).map_err(CompensationError::plan_parse)?;
    plan.validate()?;
    debug!(plan_id = %plan.id, rules = plan.rules.len(), "Loaded plan");
    Ok(plan)
}

/// Reads and parses a plan file
pub fn load_plan_from_file(path: impl AsRef<Path>) -> Result<Plan, CompensationError> {
    load_plan_from_str(&read_document(path.as_ref())?)
}

/// Parses a transaction batch from a JSON array
pub fn load_transactions_from_str(json: &str) -> Result<Vec<Transaction>, CompensationError> {
    let transactions: Vec<Transaction> =
        serde_json::from_str(json).map_err(CompensationError::transaction_parse)?;
    debug!(count = transactions.len(), "Loaded transactions");
    Ok(transactions)
}

/// Reads and parses a transaction batch file
pub fn load_transactions_from_file(path: impl AsRef<Path>) -> Result<Vec<Transaction>, CompensationError> {
    load_transactions_from_str(&read_document(path.as_ref())?)
}

fn read_document(path: &Path) -> Result<String, CompensationError> {
    fs::read_to_string(path).map_err(|e| CompensationError::FileNotFound(format!("{}: {}", path.display(), e)))
}
