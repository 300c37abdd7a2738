//! Statement handlers

use axum::Json;
use tracing::info;
use validator::Validate;

use domain_compensation::{calculate, Statement};

use crate::dto::statements::CalculateStatementRequest;
use crate::error::ApiError;

/// Calculates a what-if statement
///
/// The plan is validated first; the calculation runs on the blocking pool
/// since large batches are CPU bound.
pub async fn calculate_statement(
    Json(request): Json<CalculateStatementRequest>,
) -> Result<Json<Statement>, ApiError> {
    request.validate()?;
    request.plan.validate()?;

    let CalculateStatementRequest { plan, transactions, options } = request;
    let options = options.into_options()?;

    let statement = tokio::task::spawn_blocking(move || calculate(&plan, &transactions, &options))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(
        period_key = %statement.period_key,
        people = statement.people.len(),
        warnings = statement.warnings.len(),
        "Calculated statement"
    );

    Ok(Json(statement))
}
