//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every query is filtered by the owning user's id.

pub mod account;
pub mod entry;
pub mod tag;
pub mod user;

pub use account::{AccountError, AccountRepository};
pub use entry::{EntryError, EntryRepository, EntryWithDetails};
pub use tag::TagRepository;
pub use user::{UserError, UserRepository};

use sea_orm::{DbErr, SqlErr};

/// Returns true if `err` is a unique constraint violation on any backend.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
