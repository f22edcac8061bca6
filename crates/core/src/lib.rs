//! Core ledger logic for Budgie.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, filters and the storage seam live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry bookkeeping: records, validation, filters, stores
//! - `session` - Per-operation user scope

pub mod ledger;
pub mod session;

pub use session::{Credentials, ScopedLedger, UserScope, authenticate, set_current_user};
