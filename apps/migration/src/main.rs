//! Migration CLI tool.
//!
//! Reads `DATABASE_URL` (from the environment or `.env`) and applies the
//! schema used by the Postgres repositories: `migration up`, `down`, `status`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info,sqlx=warn")
        .init();

    tracing::info!("Running Folio migrations");
    cli::run_cli(migration::Migrator).await;
}
