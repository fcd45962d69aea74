use crate::api::error::ApiError;
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::handlers::{
    require_branch, require_emissions_source, ApiResult, AppState, ListQuery,
};
use crate::model::{
    CarbonEmissionsSource, CarbonEmissionsSourceUpdate, CarbonFootprint, CarbonFootprintUpdate,
    CarbonSequestration, CarbonSequestrationUpdate, Id, NewCarbonEmissionsSource,
    NewCarbonFootprint, NewCarbonSequestration,
};
use crate::store::traits::{EmissionsSourceStore, FootprintStore, SequestrationStore, Store};
use axum::{extract::State, response::Json};

// Emission sources hang off branches; footprints and sequestrations hang off sources.

/// GET /branch/{id}/emissionssources
pub async fn list_branch_sources<S: Store>(
    ApiPath(branch_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<CarbonEmissionsSource>> {
    let page = query.page()?;
    require_branch(&*store, branch_id).await?;
    let sources = store
        .list_emissions_sources_for_branch(branch_id, page)
        .await?;
    Ok(Json(sources))
}

/// POST /emissionssource
pub async fn create_emissions_source<S: Store>(
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<NewCarbonEmissionsSource>,
) -> ApiResult<CarbonEmissionsSource> {
    req.validate()?;
    require_branch(&*store, req.branch_id).await?;

    let source = store.create_emissions_source(req).await?;
    log::info!(
        "Created emissions source {} ({}, {}) under branch {:?}",
        source.id,
        source.source_type,
        source.total_emission_value,
        source.branch_id
    );
    Ok(Json(source))
}

/// GET /emissionssource/{id}
pub async fn get_emissions_source<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonEmissionsSource> {
    Ok(Json(require_emissions_source(&*store, id).await?))
}

/// PUT /emissionssource/{id}
pub async fn update_emissions_source<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<CarbonEmissionsSourceUpdate>,
) -> ApiResult<CarbonEmissionsSource> {
    req.validate()?;
    if let Some(branch_id) = req.branch_id.as_present() {
        require_branch(&*store, *branch_id).await?;
    }

    let source = store
        .update_emissions_source(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Emissions source"))?;
    log::info!("Updated emissions source {}", id);
    Ok(Json(source))
}

/// DELETE /emissionssource/{id}
pub async fn delete_emissions_source<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonEmissionsSource> {
    let source = store
        .delete_emissions_source(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Emissions source"))?;
    log::info!("Deleted emissions source {}", source.id);
    Ok(Json(source))
}

/// GET /emissionssource/{id}/footprints
pub async fn list_source_footprints<S: Store>(
    ApiPath(source_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<CarbonFootprint>> {
    let page = query.page()?;
    require_emissions_source(&*store, source_id).await?;
    let footprints = store.list_footprints_for_source(source_id, page).await?;
    Ok(Json(footprints))
}

/// GET /emissionssource/{id}/sequestrations
pub async fn list_source_sequestrations<S: Store>(
    ApiPath(source_id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Vec<CarbonSequestration>> {
    let page = query.page()?;
    require_emissions_source(&*store, source_id).await?;
    let sequestrations = store
        .list_sequestrations_for_source(source_id, page)
        .await?;
    Ok(Json(sequestrations))
}

/// POST /footprint
pub async fn create_footprint<S: Store>(
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<NewCarbonFootprint>,
) -> ApiResult<CarbonFootprint> {
    req.validate()?;
    require_emissions_source(&*store, req.source_id).await?;

    let footprint = store.create_footprint(req).await?;
    log::info!(
        "Created footprint {} ({}) for source {:?}",
        footprint.id,
        footprint.footprint_value,
        footprint.source_id
    );
    Ok(Json(footprint))
}

/// GET /carbon_footprint/{id}
pub async fn get_footprint<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonFootprint> {
    let footprint = store
        .get_footprint(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon footprint"))?;
    Ok(Json(footprint))
}

/// PUT /carbon_footprint/{id}
pub async fn update_footprint<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<CarbonFootprintUpdate>,
) -> ApiResult<CarbonFootprint> {
    req.validate()?;
    if let Some(source_id) = req.source_id.as_present() {
        require_emissions_source(&*store, *source_id).await?;
    }

    let footprint = store
        .update_footprint(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon footprint"))?;
    log::info!("Updated footprint {}", id);
    Ok(Json(footprint))
}

/// DELETE /carbon_footprint/{id}
pub async fn delete_footprint<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonFootprint> {
    let footprint = store
        .delete_footprint(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon footprint"))?;
    log::info!("Deleted footprint {}", footprint.id);
    Ok(Json(footprint))
}

/// POST /sequestration
pub async fn create_sequestration<S: Store>(
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<NewCarbonSequestration>,
) -> ApiResult<CarbonSequestration> {
    req.validate()?;
    require_emissions_source(&*store, req.source_id).await?;

    let sequestration = store.create_sequestration(req).await?;
    log::info!(
        "Created sequestration {} ({}) for source {:?}",
        sequestration.id,
        sequestration.seq_value,
        sequestration.source_id
    );
    Ok(Json(sequestration))
}

/// GET /carbon_sequestration/{id}
pub async fn get_sequestration<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonSequestration> {
    let sequestration = store
        .get_sequestration(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon sequestration"))?;
    Ok(Json(sequestration))
}

/// PUT /carbon_sequestration/{id}
pub async fn update_sequestration<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
    ApiJson(req): ApiJson<CarbonSequestrationUpdate>,
) -> ApiResult<CarbonSequestration> {
    req.validate()?;
    if let Some(source_id) = req.source_id.as_present() {
        require_emissions_source(&*store, *source_id).await?;
    }

    let sequestration = store
        .update_sequestration(id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon sequestration"))?;
    log::info!("Updated sequestration {}", id);
    Ok(Json(sequestration))
}

/// DELETE /carbon_sequestration/{id}
pub async fn delete_sequestration<S: Store>(
    ApiPath(id): ApiPath<Id>,
    State(store): State<AppState<S>>,
) -> ApiResult<CarbonSequestration> {
    let sequestration = store
        .delete_sequestration(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Carbon sequestration"))?;
    log::info!("Deleted sequestration {}", sequestration.id);
    Ok(Json(sequestration))
}
