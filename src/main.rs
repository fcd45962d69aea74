use carbon_ledger::config::{AppConfig, StorageBackend};
use carbon_ledger::seed;
use carbon_ledger::store::{MemoryStore, PostgresStore, Store};
use carbon_ledger::{build_app, run_server};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default, sqlx clamped to Warn; RUST_LOG still wins
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}, backend={:?}, delete_policy={}",
        config.server.host,
        config.server.port,
        config.database.backend,
        config.ledger.delete_policy
    );

    match config.database.backend {
        StorageBackend::Postgres => {
            log::info!("Connecting to PostgreSQL...");
            let postgres_store =
                PostgresStore::new(&config.database_url(), config.max_connections())
                    .await?
                    .with_delete_policy(config.ledger.delete_policy);

            log::info!("Running database migrations...");
            postgres_store.migrate().await?;

            start(Arc::new(postgres_store), &config).await
        }
        StorageBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on restart");
            let memory_store =
                MemoryStore::new().with_delete_policy(config.ledger.delete_policy);

            start(Arc::new(memory_store), &config).await
        }
    }
}

async fn start<S: Store + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    run_server(build_app(store), config).await
}
