//! Double-entry personal ledger.
//!
//! This module implements the core ledger functionality:
//! - Domain types for users, accounts and entries
//! - Input validation producing typed records
//! - Query filters for accounts and entries
//! - The storage seam and an in-memory store
//! - Error types for ledger operations

pub mod error;
pub mod filter;
pub mod memory;
pub mod store;
pub mod types;
pub mod validation;

pub use error::LedgerError;
pub use filter::{AccountFilter, EntryFilter};
pub use memory::MemoryLedgerStore;
pub use store::LedgerStore;
pub use types::{
    Account, AccountRef, AccountType, Entry, NewAccount, NewEntry, NewUser, User,
};
pub use validation::{ValidationErrors, validate_account, validate_entry, validate_user};
