//! Statement DTOs

use serde::Deserialize;
use validator::Validate;

use core_kernel::{PeriodKey, TemporalError};
use domain_compensation::{CalculationOptions, Plan, Transaction};

/// Body of a what-if calculation
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalculateStatementRequest {
    pub plan: Plan,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    #[validate(nested)]
    pub options: CalculationOptionsRequest,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalculationOptionsRequest {
    /// `YYYY-MM` or `ALL`
    #[validate(length(min = 3, max = 7))]
    pub period_key: Option<String>,
}

impl CalculationOptionsRequest {
    /// Parses the options into engine options
    pub fn into_options(self) -> Result<CalculationOptions, TemporalError> {
        let period_key = self
            .period_key
            .map(|key| key.parse::<PeriodKey>())
            .transpose()?;
        Ok(CalculationOptions { period_key })
    }
}
