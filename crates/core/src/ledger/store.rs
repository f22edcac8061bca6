//! Storage seam for the ledger.
//!
//! Implemented by the database crate and by [`MemoryLedgerStore`]. Every
//! operation except the user ones takes the caller's [`UserScope`] explicitly,
//! so concurrent operations for different users never share scope state.
//!
//! Mutating operations are atomic: they either apply every write (entry, its
//! account references and tag links) or none.
//!
//! [`MemoryLedgerStore`]: super::memory::MemoryLedgerStore

use std::future::Future;

use budgie_shared::types::{AccountId, EntryId, UserId};

use super::error::LedgerError;
use super::filter::{AccountFilter, EntryFilter};
use super::types::{Account, Entry, NewAccount, NewEntry, NewUser, User};
use crate::session::UserScope;

/// Persistent ledger state for many users.
pub trait LedgerStore: Send + Sync {
    /// Registers a user.
    ///
    /// Fails with [`LedgerError::DuplicateUser`] when the email is taken.
    fn create_user(
        &self,
        user: NewUser,
    ) -> impl Future<Output = Result<UserId, LedgerError>> + Send;

    /// Looks a user up by exact, case-sensitive email. Not scoped.
    ///
    /// Fails with [`LedgerError::UserNotFound`].
    fn get_user(&self, email: &str) -> impl Future<Output = Result<User, LedgerError>> + Send;

    /// Creates an account for the scoped user.
    ///
    /// Fails with [`LedgerError::DuplicateAccount`] when the user already has
    /// an account with this name and type.
    fn create_account(
        &self,
        scope: &UserScope,
        account: NewAccount,
    ) -> impl Future<Output = Result<AccountId, LedgerError>> + Send;

    /// Lists the scoped user's accounts matching `filter`, ordered by name then type.
    fn list_accounts(
        &self,
        scope: &UserScope,
        filter: &AccountFilter,
    ) -> impl Future<Output = Result<Vec<Account>, LedgerError>> + Send;

    /// Adds an entry for the scoped user, creating any new tags.
    ///
    /// Fails with [`LedgerError::AccountNotFound`],
    /// [`LedgerError::AmbiguousAccount`] or [`LedgerError::SameAccount`]
    /// without persisting anything.
    fn add_entry(
        &self,
        scope: &UserScope,
        entry: NewEntry,
    ) -> impl Future<Output = Result<EntryId, LedgerError>> + Send;

    /// Deletes an entry and its tag links.
    ///
    /// Another user's entry is reported exactly like a missing one:
    /// [`LedgerError::EntryNotFound`].
    fn delete_entry(
        &self,
        scope: &UserScope,
        id: EntryId,
    ) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Lists the scoped user's entries matching `filter`, ordered by date then id.
    fn list_entries(
        &self,
        scope: &UserScope,
        filter: &EntryFilter,
    ) -> impl Future<Output = Result<Vec<Entry>, LedgerError>> + Send;
}
