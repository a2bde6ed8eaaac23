use anyhow::Context;
use clap::{Parser, Subcommand};
use crm_backend::config::Config;
use crm_backend::jobs::{self, JobKind};
use crm_backend::storage::SqliteStorage;
use crm_backend::{logging, observability, seed, server};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "GraphQL CRM backend with scheduled jobs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the GraphQL API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Load demo customers, products and orders
    Seed,
    /// Run one background job once
    Job {
        #[arg(value_enum)]
        kind: JobKind,
    },
    /// Run all background jobs on their intervals until Ctrl-C
    Schedule,
}

fn open_storage(config: &Config) -> anyhow::Result<Arc<SqliteStorage>> {
    let storage = SqliteStorage::open(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path.display()))?;
    Ok(Arc::new(storage))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;

    if let Err(e) = observability::init() {
        warn!("Failed to initialize metrics: {}", e);
    }

    match cli.command {
        Commands::Serve { port } => {
            let storage = open_storage(&config)?;
            server::start_server(storage, port.unwrap_or(config.server.port)).await?;
        }
        Commands::Seed => {
            let storage = open_storage(&config)?;
            let summary = seed::seed(storage.as_ref()).await?;
            info!(
                "Seeded {} customers, {} products, {} orders",
                summary.customers, summary.products, summary.orders
            );
        }
        Commands::Job { kind } => {
            for line in jobs::run_configured(kind, &config.jobs).await? {
                println!("{line}");
            }
        }
        Commands::Schedule => {
            jobs::run_scheduler(&config.jobs).await?;
        }
    }

    Ok(())
}
