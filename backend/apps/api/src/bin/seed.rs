//! Seed the tours table from `database/seed/tours.json`
//!
//! ```text
//! seed --import            # load the bundled tours
//! seed --import -f my.json # load another file
//! seed --delete            # remove every tour
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use api::config::DatabaseConfig;
use clap::Parser;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tours::application::{DeleteAllToursUseCase, ImportToursUseCase};
use tours::presentation::dto::CreateTourRequest;
use tours::{PgTourRepository, TourDraft};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SEED_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../../database/seed/tours.json");

/// `seed` command arguments.
#[derive(Debug, Parser)]
#[command(name = "seed", about = "Import or delete the tours data set", version)]
#[command(group(clap::ArgGroup::new("action").required(true).args(["import", "delete"])))]
struct CliArgs {
    /// Load every tour of the seed file (all or nothing)
    #[arg(short = 'i', long)]
    import: bool,
    /// Delete every tour
    #[arg(short = 'd', long)]
    delete: bool,
    /// Seed file, a JSON array of tours
    #[arg(short = 'f', long, value_name = "path", default_value = DEFAULT_SEED_FILE)]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,tours=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let database = DatabaseConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(database.url.expose_secret())
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    let repo = Arc::new(PgTourRepository::new(pool.clone()));

    if args.import {
        let raw = std::fs::read_to_string(&args.file)
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let requests: Vec<CreateTourRequest> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", args.file.display()))?;
        let drafts = requests.into_iter().map(TourDraft::from).collect();

        let imported = ImportToursUseCase::new(repo).execute(drafts).await?;
        tracing::info!(count = imported, "Data successfully loaded");
    } else {
        let removed = DeleteAllToursUseCase::new(repo).execute().await?;
        tracing::info!(count = removed, "Data successfully deleted");
    }

    pool.close().await;
    Ok(())
}
