use anyhow::{Context, Result};
use carbon_ledger::config::AppConfig;
use carbon_ledger::seed::{self, SeedOptions};
use carbon_ledger::store::PostgresStore;
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};

/// Generate demo data for the carbon dashboard.
#[derive(Debug, Parser)]
#[command(name = "populate-db", version)]
struct Args {
    /// Number of companies to generate
    #[arg(long, default_value_t = 10)]
    companies: usize,

    /// Number of branches per company
    #[arg(long, default_value_t = 2)]
    branches: usize,

    /// Number of carbon offsets per company
    #[arg(long, default_value_t = 2)]
    offsets: usize,

    /// Number of emissions sources per branch
    #[arg(long, default_value_t = 3)]
    emissions: usize,

    /// Number of carbon footprints per emissions source
    #[arg(long, default_value_t = 2)]
    footprints: usize,

    /// Number of carbon sequestrations per emissions source
    #[arg(long, default_value_t = 2)]
    sequestrations: usize,

    /// Seed for the random generator, for reproducible data sets
    #[arg(long)]
    seed: Option<u64>,

    /// Database to populate; defaults to the server configuration
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

impl Args {
    fn options(&self) -> SeedOptions {
        SeedOptions {
            companies: self.companies,
            branches: self.branches,
            offsets: self.offsets,
            emissions: self.emissions,
            footprints: self.footprints,
            sequestrations: self.sequestrations,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = AppConfig::load()?;
    let database_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| config.database_url());

    let store = PostgresStore::new(&database_url, config.max_connections())
        .await
        .context("Failed to connect to the database")?;
    store.migrate().await?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let report = seed::generate(&store, args.options(), &mut rng).await?;

    println!("Data has been added:");
    println!("  companies:       {}", report.companies);
    println!("  branches:        {}", report.branches);
    println!("  sources:         {}", report.emissions_sources);
    println!("  footprints:      {}", report.footprints);
    println!("  sequestrations:  {}", report.sequestrations);
    println!("  carbon offsets:  {}", report.offsets);

    Ok(())
}
