//! Database migration runner for Budgie.
//!
//! Usage:
//!   migrator up       - Run all pending migrations (default)
//!   migrator down     - Rollback last migration
//!   migrator status   - Show migration status
//!   migrator fresh    - Drop all tables and re-run migrations
//!   migrator refresh  - Rollback all migrations, then re-run them
//!   migrator reset    - Rollback all migrations
//!
//! The database comes from the Budgie configuration
//! (`BUDGIE__DATABASE__URL` or `config/*`).

use anyhow::{Context, bail};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use budgie_db::{connect, migration::Migrator};
use budgie_shared::{AppConfig, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging);

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    match command.as_str() {
        "up" => Migrator::up(&db, None).await?,
        "down" => Migrator::down(&db, Some(1)).await?,
        "status" => Migrator::status(&db).await?,
        "fresh" => Migrator::fresh(&db).await?,
        "refresh" => Migrator::refresh(&db).await?,
        "reset" => Migrator::reset(&db).await?,
        other => bail!("Unknown command '{other}', expected up|down|status|fresh|refresh|reset"),
    }

    info!(%command, "Migration command finished");
    Ok(())
}
