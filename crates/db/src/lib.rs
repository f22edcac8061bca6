//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//! - [`SeaOrmLedgerStore`], the SQL implementation of the ledger store

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod store;

pub use repositories::{AccountRepository, EntryRepository, TagRepository, UserRepository};
pub use store::SeaOrmLedgerStore;

use std::time::Duration;

use budgie_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use migration::Migrator;

/// Establishes a pooled connection to the database.
///
/// In-memory `SQLite` URLs get a single connection: every pooled connection
/// would otherwise open its own empty database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let (max, min) = if is_in_memory_sqlite(&config.url) {
        (1, 1)
    } else {
        (config.max_connections, config.min_connections)
    };

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .sqlx_logging(false);

    Database::connect(options).await
}

/// Connects and applies all pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let db = connect(config).await?;
    Migrator::up(&db, None).await?;
    info!(backend = ?db.get_database_backend(), "Database ready");
    Ok(db)
}

fn is_in_memory_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}
