//! Per-operation user scope.
//!
//! Scope is a value, never process state: [`set_current_user`] resolves an
//! email to a [`UserScope`] (wrapped in a [`ScopedLedger`]) that the caller
//! threads through every store call of one operation.

use budgie_shared::types::{AccountId, EntryId, UserId};
use tracing::{debug, warn};

use crate::ledger::{
    Account, AccountFilter, Entry, EntryFilter, LedgerError, LedgerStore, NewAccount, NewEntry,
    User,
};

/// Identity every scoped store operation is filtered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserScope {
    user_id: UserId,
    email: String,
}

impl UserScope {
    /// Builds the scope for a resolved user.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
        }
    }

    /// The scoped user's ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// The scoped user's email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Stored secret handed to the caller's password check.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    /// Stored password hash.
    pub password_hash: &'a str,
    /// Stored salt.
    pub salt: &'a str,
}

/// Resolves `email` to a scoped ledger handle.
///
/// # Errors
///
/// Returns [`LedgerError::Unauthorized`] if no user has this email.
pub async fn set_current_user<'a, S: LedgerStore>(
    store: &'a S,
    email: &str,
) -> Result<ScopedLedger<'a, S>, LedgerError> {
    let user = store.get_user(email).await.map_err(unauthorized)?;
    debug!(user_id = %user.id, "Scope established");
    Ok(ScopedLedger::new(store, UserScope::from_user(&user)))
}

/// Looks a user up and lets `verify` compare the supplied password against
/// the stored hash and salt.
///
/// # Errors
///
/// Returns [`LedgerError::Unauthorized`] for an unknown email or a failed check.
pub async fn authenticate<S, F>(store: &S, email: &str, verify: F) -> Result<User, LedgerError>
where
    S: LedgerStore,
    F: FnOnce(&Credentials<'_>) -> bool,
{
    let user = store.get_user(email).await.map_err(unauthorized)?;
    let credentials = Credentials {
        password_hash: &user.password_hash,
        salt: &user.salt,
    };

    if verify(&credentials) {
        Ok(user)
    } else {
        warn!(user_id = %user.id, "Password check failed");
        Err(LedgerError::Unauthorized)
    }
}

fn unauthorized(err: LedgerError) -> LedgerError {
    match err {
        LedgerError::UserNotFound(_) => LedgerError::Unauthorized,
        other => other,
    }
}

/// A store bound to one user's scope for the length of an operation.
#[derive(Debug)]
pub struct ScopedLedger<'a, S> {
    store: &'a S,
    scope: UserScope,
}

impl<S> Clone for ScopedLedger<'_, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            scope: self.scope.clone(),
        }
    }
}

impl<'a, S: LedgerStore> ScopedLedger<'a, S> {
    /// Binds `store` to `scope`.
    #[must_use]
    pub const fn new(store: &'a S, scope: UserScope) -> Self {
        Self { store, scope }
    }

    /// The bound scope.
    #[must_use]
    pub const fn scope(&self) -> &UserScope {
        &self.scope
    }

    /// See [`LedgerStore::create_account`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicateAccount`] on a name and type collision.
    pub async fn create_account(&self, account: NewAccount) -> Result<AccountId, LedgerError> {
        self.store.create_account(&self.scope, account).await
    }

    /// See [`LedgerStore::list_accounts`].
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_accounts(&self, filter: &AccountFilter) -> Result<Vec<Account>, LedgerError> {
        self.store.list_accounts(&self.scope, filter).await
    }

    /// See [`LedgerStore::add_entry`].
    ///
    /// # Errors
    ///
    /// Returns an account resolution error; nothing is persisted in that case.
    pub async fn add_entry(&self, entry: NewEntry) -> Result<EntryId, LedgerError> {
        self.store.add_entry(&self.scope, entry).await
    }

    /// See [`LedgerStore::delete_entry`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::EntryNotFound`] if the user has no such entry.
    pub async fn delete_entry(&self, id: EntryId) -> Result<(), LedgerError> {
        self.store.delete_entry(&self.scope, id).await
    }

    /// See [`LedgerStore::list_entries`].
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, LedgerError> {
        self.store.list_entries(&self.scope, filter).await
    }
}
