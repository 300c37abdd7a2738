//! Plan handlers

use axum::Json;

use domain_compensation::Plan;

use crate::dto::plans::PlanValidationResponse;

/// Checks a plan for structural problems without running it
pub async fn validate_plan(Json(plan): Json<Plan>) -> Json<PlanValidationResponse> {
    let issues = plan.validation_issues();
    Json(PlanValidationResponse {
        valid: issues.is_empty(),
        issues,
    })
}
