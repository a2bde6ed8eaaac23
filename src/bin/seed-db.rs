use anyhow::Context;
use crm_backend::config::Config;
use crm_backend::storage::SqliteStorage;
use crm_backend::{logging, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let config = Config::load()?;

    println!("Seeding {}", config.database.path.display());
    let storage = SqliteStorage::open(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path.display()))?;
    let summary = seed::seed(&storage).await?;

    println!("Seeded {} customers.", summary.customers);
    println!("Seeded {} products.", summary.products);
    println!("Seeded {} orders.", summary.orders);
    Ok(())
}
