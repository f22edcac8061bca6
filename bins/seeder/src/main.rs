//! Demo ledger seeder for Budgie development and testing.
//!
//! Registers a demo user with a small chart of accounts and a month of
//! entries. Safe to run repeatedly: existing users, accounts and entries are
//! left alone.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use serde_json::{Value, json};
use tracing::info;

use budgie_core::ledger::{
    EntryFilter, LedgerError, LedgerStore, validate_account, validate_entry, validate_user,
};
use budgie_core::session::set_current_user;
use budgie_db::{SeaOrmLedgerStore, connect_and_migrate};
use budgie_shared::{AppConfig, telemetry};

/// Demo user email (consistent for all seeds).
const DEMO_EMAIL: &str = "demo@budgie.dev";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging);

    let db = connect_and_migrate(&config.database)
        .await
        .context("Failed to prepare database")?;
    let store = SeaOrmLedgerStore::new(db);

    seed_user(&store).await?;
    seed_accounts(&store).await?;
    seed_entries(&store).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_user(store: &SeaOrmLedgerStore) -> anyhow::Result<()> {
    let user = validate_user(&json!({
        "name": "Demo User",
        "email": DEMO_EMAIL,
        "password": "$2b$12$demo_hash_not_for_login",
        "salt": "$2b$12$demo_salt",
        "created": "2024-01-01"
    }))?;

    match store.create_user(user).await {
        Ok(id) => info!(user_id = %id, "Demo user created"),
        Err(LedgerError::DuplicateUser(_)) => info!("Demo user already exists, skipping"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

async fn seed_accounts(store: &SeaOrmLedgerStore) -> anyhow::Result<()> {
    let ledger = set_current_user(store, DEMO_EMAIL).await?;

    let accounts = [
        json!({"name": "checking", "type": "asset", "description": "Everyday bank account"}),
        json!({"name": "cash", "type": "asset"}),
        json!({"name": "credit card", "type": "liability"}),
        json!({"name": "salary", "type": "income"}),
        json!({"name": "groceries", "type": "expense", "description": "Food and household"}),
        json!({"name": "rent", "type": "expense"}),
        json!({"name": "opening balance", "type": "equity"}),
    ];

    let mut created = 0;
    for input in &accounts {
        match ledger.create_account(validate_account(input)?).await {
            Ok(_) => created += 1,
            Err(LedgerError::DuplicateAccount { .. }) => {}
            Err(err) => return Err(err.into()),
        }
    }
    info!(created, total = accounts.len(), "Accounts seeded");
    Ok(())
}

async fn seed_entries(store: &SeaOrmLedgerStore) -> anyhow::Result<()> {
    let ledger = set_current_user(store, DEMO_EMAIL).await?;

    if !ledger.list_entries(&EntryFilter::new()).await?.is_empty() {
        info!("Entries already exist, skipping");
        return Ok(());
    }

    let entries: [Value; 6] = [
        json!({"when": "2024-01-01", "credit_account": "opening balance", "debit_account": "checking",
               "amount": "1500.00", "description": "Opening balance"}),
        json!({"when": "2024-01-02", "credit_account": "checking", "debit_account": "rent",
               "amount": "950.00", "who": "Landlord", "tags": ["housing", "monthly"]}),
        json!({"when": "2024-01-06", "credit_account": "credit card", "debit_account": "groceries",
               "amount": "84.37", "who": "Corner Shop", "tags": ["food"]}),
        json!({"when": "2024-01-13", "credit_account": "cash", "debit_account": "groceries",
               "amount": "12.50", "who": "Market", "tags": ["food"]}),
        json!({"when": "2024-01-25", "credit_account": "salary", "debit_account": "checking",
               "amount": "2400.00", "who": "Employer", "tags": ["monthly"]}),
        json!({"when": "2024-01-28", "credit_account": "checking", "debit_account": "credit card",
               "amount": "84.37", "description": "Card payment"}),
    ];

    for input in &entries {
        ledger.add_entry(validate_entry(input)?).await?;
    }
    info!(count = entries.len(), "Entries seeded");
    Ok(())
}
