use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::model::{
    CarbonEmissionsSource, CarbonOffset, CarbonOffsetUpdate, CarbonRegulation,
    CarbonRegulationUpdate, Company, CompanyBranch, CompanyBranchUpdate, CompanyUpdate, Id,
    NewCarbonOffset, NewCarbonRegulation, NewCompany, NewCompanyBranch, Page,
};
use crate::store::traits::{
    BranchStore, CompanyStore, EmissionsSourceStore, OffsetStore, RegulationStore, Store,
};

pub type AppState<S> = Arc<S>;
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// `skip` / `limit` query parameters accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn page(&self) -> Result<Page, ApiError> {
        Ok(Page::new(self.skip, self.limit)?)
    }
}

// Parent resolution shared by every endpoint scoped to, or creating under, a parent.

pub(crate) async fn require_company<S: Store>(store: &S, id: Id) -> Result<Company, ApiError> {
    store
        .get_company(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company"))
}

pub(crate) async fn require_branch<S: Store>(store: &S, id: Id) -> Result<CompanyBranch, ApiError> {
    store
        .get_branch(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Branch"))
}

pub(crate) async fn require_emissions_source<S: Store>(
    store: &S,
    id: Id,
) -> Result<CarbonEmissionsSource, ApiError> {
    store
        .get_emissions_source(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Emissions source"))
}

async fn require_regulation<S: Store>(store: &S, id: Id) -> Result<CarbonRegulation, ApiError> {
    store
        .get_regulation(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Regulation"))
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// POST /companies
pub async fn create_company<S: Store>(
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<NewCompany>,
) -> ApiResult<Company> {
    req.validate()?;
    if store.find_company_by_name(&req.c_name).await?.is_some() {
        return Err(ApiError::Conflict("Company already registered".to_string()));
    }

    let company = store.create_company(req).await?;
    log::info!("Created company {} ({})", company.id, company.c_name);
    Ok(Json(company))
}

/// GET /companies
pub async fn list_companies<S: Store>(
    State(store): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<Company>> {
    let companies = store.list_companies(query.page()?).await?;
    Ok(Json(companies))
}

/// GET /company/{id}
pub async fn get_company<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<Company> {
    Ok(Json(require_company(&*store, id).await?))
}

/// PUT /company/{id}
pub async fn update_company<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<CompanyUpdate>,
) -> ApiResult<Company> {
    req.validate()?;
    require_company(&*store, id).await?;
    if let Some(name) = req.c_name.as_present() {
        if let Some(existing) = store.find_company_by_name(name).await? {
            if existing.id != id {
                return Err(ApiError::Conflict("Company already registered".to_string()));
            }
        }
    }

    let company = store
        .update_company(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Company"))?;
    log::info!("Updated company {}", id);
    Ok(Json(company))
}

/// DELETE /company/{id}
pub async fn delete_company<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<Company> {
    let company = store
        .delete_company(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company"))?;
    log::info!("Deleted company {} ({})", company.id, company.c_name);
    Ok(Json(company))
}

/// GET /companies/{id}/branches
pub async fn list_company_branches<S: Store>(
    ApiPath(company_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<CompanyBranch>> {
    let page = query.page()?;
    require_company(&*store, company_id).await?;
    let branches = store.list_branches_for_company(company_id, page).await?;
    Ok(Json(branches))
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// POST /branches
pub async fn create_branch<S: Store>(
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<NewCompanyBranch>,
) -> ApiResult<CompanyBranch> {
    req.validate()?;
    require_company(&*store, req.company_id).await?;

    let branch = store.create_branch(req).await?;
    log::info!(
        "Created branch {} under company {:?}",
        branch.id,
        branch.company_id
    );
    Ok(Json(branch))
}

/// GET /branch/{id}
pub async fn get_branch<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CompanyBranch> {
    Ok(Json(require_branch(&*store, id).await?))
}

/// PUT /branch/{id}
pub async fn update_branch<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<CompanyBranchUpdate>,
) -> ApiResult<CompanyBranch> {
    req.validate()?;
    if let Some(company_id) = req.company_id.as_present() {
        require_company(&*store, *company_id).await?;
    }

    let branch = store
        .update_branch(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Branch"))?;
    log::info!("Updated branch {}", id);
    Ok(Json(branch))
}

/// DELETE /branch/{id}
pub async fn delete_branch<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CompanyBranch> {
    let branch = store
        .delete_branch(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Branch"))?;
    log::info!("Deleted branch {}", branch.id);
    Ok(Json(branch))
}

// ---------------------------------------------------------------------------
// Carbon offsets
// ---------------------------------------------------------------------------

/// GET /companies/{id}/carbon_offsets
pub async fn list_company_offsets<S: Store>(
    ApiPath(company_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<CarbonOffset>> {
    let page = query.page()?;
    require_company(&*store, company_id).await?;
    let offsets = store.list_offsets_for_company(company_id, page).await?;
    Ok(Json(offsets))
}

/// POST /carbon_offset
pub async fn create_offset<S: Store>(
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<NewCarbonOffset>,
) -> ApiResult<CarbonOffset> {
    require_company(&*store, req.company_id).await?;

    let offset = store.create_offset(req).await?;
    log::info!(
        "Created carbon offset {} ({}, {}) for company {:?}",
        offset.id,
        offset.offset_type,
        offset.offset_amount,
        offset.company_id
    );
    Ok(Json(offset))
}

/// GET /carbon_offset/{id}
pub async fn get_offset<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonOffset> {
    let offset = store
        .get_offset(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon offset"))?;
    Ok(Json(offset))
}

/// PUT /carbon_offset/{id}
pub async fn update_offset<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<CarbonOffsetUpdate>,
) -> ApiResult<CarbonOffset> {
    if let Some(company_id) = req.company_id.as_present() {
        require_company(&*store, *company_id).await?;
    }

    let offset = store
        .update_offset(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon offset"))?;
    log::info!("Updated carbon offset {}", id);
    Ok(Json(offset))
}

/// DELETE /carbon_offset/{id}
pub async fn delete_offset<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonOffset> {
    let offset = store
        .delete_offset(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon offset"))?;
    log::info!("Deleted carbon offset {}", offset.id);
    Ok(Json(offset))
}

// ---------------------------------------------------------------------------
// Regulations
// ---------------------------------------------------------------------------

/// POST /regulations
pub async fn create_regulation<S: Store>(
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<NewCarbonRegulation>,
) -> ApiResult<CarbonRegulation> {
    req.validate()?;
    if store
        .find_regulation_by_name(&req.regulation_name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Regulation already exists".to_string()));
    }

    let regulation = store.create_regulation(req).await?;
    log::info!(
        "Created regulation {} ({})",
        regulation.id,
        regulation.regulation_name
    );
    Ok(Json(regulation))
}

/// GET /regulations
pub async fn list_regulations<S: Store>(
    State(store): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<CarbonRegulation>> {
    let regulations = store.list_regulations(query.page()?).await?;
    Ok(Json(regulations))
}

/// GET /regulation/{id}
pub async fn get_regulation<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonRegulation> {
    Ok(Json(require_regulation(&*store, id).await?))
}

/// PUT /regulation/{id}
pub async fn update_regulation<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<CarbonRegulationUpdate>,
) -> ApiResult<CarbonRegulation> {
    req.validate()?;
    require_regulation(&*store, id).await?;
    if let Some(name) = req.regulation_name.as_present() {
        if let Some(existing) = store.find_regulation_by_name(name).await? {
            if existing.id != id {
                return Err(ApiError::Conflict("Regulation already exists".to_string()));
            }
        }
    }

    let regulation = store
        .update_regulation(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Regulation"))?;
    log::info!("Updated regulation {}", id);
    Ok(Json(regulation))
}

/// DELETE /regulation/{id}
pub async fn delete_regulation<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonRegulation> {
    let regulation = store
        .delete_regulation(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Regulation"))?;
    log::info!("Deleted regulation {}", regulation.id);
    Ok(Json(regulation))
}
