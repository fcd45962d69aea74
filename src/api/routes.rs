use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::api::{emissions_handlers, handlers, summary_handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Companies
        .route(
            "/companies",
            get(handlers::list_companies::<S>).post(handlers::create_company::<S>),
        )
        .route(
            "/company/:id",
            get(handlers::get_company::<S>)
                .put(handlers::update_company::<S>)
                .delete(handlers::delete_company::<S>),
        )
        .route(
            "/companies/:id/branches",
            get(handlers::list_company_branches::<S>),
        )
        // Branches
        .route("/branches", post(handlers::create_branch::<S>))
        .route(
            "/branch/:id",
            get(handlers::get_branch::<S>)
                .put(handlers::update_branch::<S>)
                .delete(handlers::delete_branch::<S>),
        )
        .route(
            "/branch/:id/emissionssources",
            get(emissions_handlers::list_branch_sources::<S>),
        )
        // Emission sources
        .route(
            "/emissionssource",
            post(emissions_handlers::create_emissions_source::<S>),
        )
        .route(
            "/emissionssource/:id",
            get(emissions_handlers::get_emissions_source::<S>)
                .put(emissions_handlers::update_emissions_source::<S>)
                .delete(emissions_handlers::delete_emissions_source::<S>),
        )
        .route(
            "/emissionssource/:id/footprints",
            get(emissions_handlers::list_source_footprints::<S>),
        )
        .route(
            "/emissionssource/:id/sequestrations",
            get(emissions_handlers::list_source_sequestrations::<S>),
        )
        // Footprints and sequestrations
        .route("/footprint", post(emissions_handlers::create_footprint::<S>))
        .route(
            "/carbon_footprint/:id",
            get(emissions_handlers::get_footprint::<S>)
                .put(emissions_handlers::update_footprint::<S>)
                .delete(emissions_handlers::delete_footprint::<S>),
        )
        .route(
            "/sequestration",
            post(emissions_handlers::create_sequestration::<S>),
        )
        .route(
            "/carbon_sequestration/:id",
            get(emissions_handlers::get_sequestration::<S>)
                .put(emissions_handlers::update_sequestration::<S>)
                .delete(emissions_handlers::delete_sequestration::<S>),
        )
        // Carbon offsets
        .route(
            "/companies/:id/carbon_offsets",
            get(handlers::list_company_offsets::<S>),
        )
        .route(
            "/companies/:id/carbon_offsets/total",
            get(summary_handlers::company_offset_total::<S>),
        )
        .route("/carbon_offset", post(handlers::create_offset::<S>))
        .route(
            "/carbon_offset/:id",
            get(handlers::get_offset::<S>)
                .put(handlers::update_offset::<S>)
                .delete(handlers::delete_offset::<S>),
        )
        // Regulations
        .route(
            "/regulations",
            get(handlers::list_regulations::<S>).post(handlers::create_regulation::<S>),
        )
        .route(
            "/regulation/:id",
            get(handlers::get_regulation::<S>)
                .put(handlers::update_regulation::<S>)
                .delete(handlers::delete_regulation::<S>),
        )
        // Summaries
        .route(
            "/company/:id/summary",
            get(summary_handlers::company_summary::<S>),
        )
        .route(
            "/branch/:id/summary",
            get(summary_handlers::branch_summary::<S>),
        )
        .route(
            "/companies/summary",
            get(summary_handlers::fleet_summary::<S>),
        )
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
