//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and are written with the
//! schema builder so they run unchanged on `PostgreSQL` and `SQLite`.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_ledger;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250301_000001_create_ledger::Migration)]
    }
}
