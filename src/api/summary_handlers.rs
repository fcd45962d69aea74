use crate::api::extract::ApiPath;
use crate::api::handlers::{require_branch, require_company, ApiResult, AppState};
use crate::logic::Aggregator;
use crate::model::{CarbonOffsetTotal, EmissionSummary, FleetSummary, Id};
use crate::store::traits::Store;
use axum::{extract::State, response::Json};

/// GET /company/{id}/summary
pub async fn company_summary<S: Store>(
    ApiPath(company_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<EmissionSummary> {
    require_company(&*store, company_id).await?;
    let summary = Aggregator::company_summary(&*store, company_id).await?;
    Ok(Json(summary))
}

/// GET /branch/{id}/summary
pub async fn branch_summary<S: Store>(
    ApiPath(branch_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<EmissionSummary> {
    require_branch(&*store, branch_id).await?;
    let summary = Aggregator::branch_summary(&*store, branch_id).await?;
    Ok(Json(summary))
}

/// GET /companies/summary
///
/// Footprint and sequestration totals keyed by company name (pie chart data).
pub async fn fleet_summary<S: Store>(State(store): State<AppState<S>>) -> ApiResult<FleetSummary> {
    let summary = Aggregator::fleet_summary(&*store).await?;
    Ok(Json(summary))
}

/// GET /companies/{id}/carbon_offsets/total
pub async fn company_offset_total<S: Store>(
    ApiPath(company_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonOffsetTotal> {
    require_company(&*store, company_id).await?;
    let total_offset_amount = Aggregator::carbon_offset_total(&*store, company_id).await?;
    Ok(Json(CarbonOffsetTotal {
        company_id,
        total_offset_amount,
    }))
}
