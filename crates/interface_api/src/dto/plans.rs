//! Plan DTOs

use serde::Serialize;

/// Result of validating a plan document
#[derive(Debug, Serialize)]
pub struct PlanValidationResponse {
    pub valid: bool,
    pub issues: Vec<String>,
}
