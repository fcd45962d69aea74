pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

// Export API types
pub use api::routes::create_router;
pub use api::{ApiError, ErrorResponse};

pub use crate::config::{AppConfig, StorageBackend};
pub use logic::Aggregator;

// Export all model types
pub use model::*;

// Export store types
pub use store::{DeletePolicy, MemoryStore, PostgresStore, Store, StoreError};

/// Router with its state attached, ready to be served.
pub fn build_app<S: Store + 'static>(store: Arc<S>) -> Router {
    create_router().with_state(store)
}

/// Bind the configured address and serve until the process is stopped.
pub async fn run_server(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Carbon ledger listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
