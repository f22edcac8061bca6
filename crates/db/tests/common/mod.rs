//! Shared fixtures for the database integration tests.
//!
//! Each test gets a fresh in-memory `SQLite` database unless
//! `BUDGIE_TEST_DATABASE_URL` points at a shared server, in which case
//! fixtures use unique emails so tests do not collide.
//!
//! In-memory `SQLite` runs on a single pooled connection. Tests that need
//! several connections to contend use [`FileDatabase`] or [`server_store`].

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use budgie_core::ledger::{
    AccountRef, AccountType, LedgerStore, NewAccount, NewEntry, NewUser,
};
use budgie_core::session::UserScope;
use budgie_db::{SeaOrmLedgerStore, connect_and_migrate};
use budgie_shared::DatabaseConfig;
use budgie_shared::types::Amount;

/// Get database URL from environment or use in-memory `SQLite`.
pub fn get_database_url() -> String {
    std::env::var("BUDGIE_TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

pub async fn database() -> DatabaseConnection {
    connect_and_migrate(&DatabaseConfig::new(get_database_url()))
        .await
        .expect("Failed to connect to database")
}

pub async fn store() -> SeaOrmLedgerStore {
    SeaOrmLedgerStore::new(database().await)
}

/// Store on the server named by `BUDGIE_TEST_DATABASE_URL`.
///
/// Tests using it are `#[ignore]`d and run with `cargo test -- --ignored`
/// once the variable points at a database server.
pub async fn server_store() -> SeaOrmLedgerStore {
    let url = std::env::var("BUDGIE_TEST_DATABASE_URL")
        .expect("BUDGIE_TEST_DATABASE_URL must point at a database server");
    let db = connect_and_migrate(&DatabaseConfig::new(url))
        .await
        .expect("Failed to connect to database");
    SeaOrmLedgerStore::new(db)
}

/// A migrated `SQLite` database in a temporary file, served by a pool of
/// several connections. The file is removed on drop.
pub struct FileDatabase {
    path: PathBuf,
    pub db: DatabaseConnection,
}

impl FileDatabase {
    pub async fn new() -> Self {
        let path = std::env::temp_dir().join(format!("budgie-test-{}.db", Uuid::new_v4()));
        let mut config = DatabaseConfig::new(format!("sqlite://{}?mode=rwc", path.display()));
        config.max_connections = 4;
        let db = connect_and_migrate(&config)
            .await
            .expect("Failed to create file database");
        Self { path, db }
    }

    pub fn store(&self) -> SeaOrmLedgerStore {
        SeaOrmLedgerStore::new(self.db.clone())
    }
}

impl Drop for FileDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$2b$12$test_hash".to_string(),
        salt: "$2b$12$test_salt".to_string(),
        created: date(2024, 1, 1),
    }
}

pub fn account(name: &str, account_type: AccountType) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        account_type,
        description: format!("{name} account"),
    }
}

pub fn entry(when: NaiveDate, credit: &str, debit: &str, amount: &str, tags: &[&str]) -> NewEntry {
    NewEntry {
        when,
        credit_account: AccountRef::named(credit),
        debit_account: AccountRef::named(debit),
        amount: amount.parse::<Amount>().unwrap(),
        who: "Corner Shop".to_string(),
        description: "test entry".to_string(),
        tags: tags.iter().map(ToString::to_string).collect(),
    }
}

/// Registers a user with `bank` (asset), `groceries` (expense) and
/// `salary` (income) accounts and returns their scope.
pub async fn user_with_accounts(store: &SeaOrmLedgerStore, prefix: &str) -> UserScope {
    let email = unique_email(prefix);
    store.create_user(new_user(&email)).await.unwrap();
    let user = store.get_user(&email).await.unwrap();
    let scope = UserScope::from_user(&user);

    for (name, kind) in [
        ("bank", AccountType::Asset),
        ("groceries", AccountType::Expense),
        ("salary", AccountType::Income),
    ] {
        store.create_account(&scope, account(name, kind)).await.unwrap();
    }
    scope
}
