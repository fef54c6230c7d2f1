use anyhow::Result;
use book_inventory::{Database, Settings};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "book-inventory")]
struct Args {
    /// Env file to read before the process environment (defaults to `.env` in the working directory or next to the executable)
    #[arg(long, env = "BOOK_INVENTORY_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Fail at startup when any database setting is missing
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let settings = Settings::load(args.env_file.as_deref())?;
    if args.strict {
        settings.require_complete()?;
    }
    info!("DB URL => {}", settings.redacted_url());
    info!("DB HOST => {}", settings.db_host);

    let database = Database::connect(&settings).await?;

    if args.skip_migrations {
        info!("Skipping database migrations");
    } else {
        info!("Running database migrations...");
        let applied = database.run_migrations().await?;
        info!("Migrations completed successfully ({} applied)", applied.len());
    }

    // Checking out a session proves the pool can reach the database.
    database.session().await?;
    info!("Book inventory store ready");

    Ok(())
}
