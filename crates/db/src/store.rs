//! SQL implementation of [`LedgerStore`].
//!
//! Translates between repository rows and ledger records, and maps
//! repository errors onto [`LedgerError`].

use sea_orm::{DatabaseConnection, DbErr};
use tracing::{error, info, warn};

use budgie_core::ledger::{
    Account, AccountFilter, Entry, EntryFilter, LedgerError, LedgerStore, NewAccount, NewEntry,
    NewUser, User,
};
use budgie_core::session::UserScope;
use budgie_shared::types::{AccountId, Amount, EntryId, UserId};

use crate::entities::{accounts, users};
use crate::repositories::{
    AccountError, AccountRepository, EntryError, EntryRepository, EntryWithDetails, TagRepository,
    UserError, UserRepository,
};

/// Ledger store backed by a `SeaORM` connection pool.
#[derive(Debug, Clone)]
pub struct SeaOrmLedgerStore {
    users: UserRepository,
    accounts: AccountRepository,
    entries: EntryRepository,
    tags: TagRepository,
}

impl SeaOrmLedgerStore {
    /// Creates a store over `db`.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            accounts: AccountRepository::new(db.clone()),
            entries: EntryRepository::new(db.clone()),
            tags: TagRepository::new(db),
        }
    }

    /// Tag labels the scoped user has, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the query fails.
    pub async fn list_tags(&self, scope: &UserScope) -> Result<Vec<String>, LedgerError> {
        let tags = self
            .tags
            .list(scope.user_id().into_inner())
            .await
            .map_err(database)?;
        Ok(tags.into_iter().map(|tag| tag.label).collect())
    }
}

impl LedgerStore for SeaOrmLedgerStore {
    async fn create_user(&self, user: NewUser) -> Result<UserId, LedgerError> {
        let created = self
            .users
            .create(&user)
            .await
            .map_err(|err| rejected(None, err.into()))?;
        info!(user_id = %created.id, "User registered");
        Ok(UserId::from_uuid(created.id))
    }

    async fn get_user(&self, email: &str) -> Result<User, LedgerError> {
        self.users
            .find_by_email(email)
            .await
            .map_err(database)?
            .map(user_from_model)
            .ok_or_else(|| LedgerError::UserNotFound(email.to_string()))
    }

    async fn create_account(
        &self,
        scope: &UserScope,
        account: NewAccount,
    ) -> Result<AccountId, LedgerError> {
        let created = self
            .accounts
            .create(scope.user_id().into_inner(), &account)
            .await
            .map_err(|err| rejected(Some(scope.user_id()), err.into()))?;
        info!(
            user_id = %scope.user_id(),
            account_id = %created.id,
            account_type = %account.account_type,
            "Account created"
        );
        Ok(AccountId::from_uuid(created.id))
    }

    async fn list_accounts(
        &self,
        scope: &UserScope,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, LedgerError> {
        let rows = self
            .accounts
            .list(scope.user_id().into_inner(), filter)
            .await
            .map_err(database)?;
        Ok(rows.into_iter().map(account_from_model).collect())
    }

    async fn add_entry(&self, scope: &UserScope, entry: NewEntry) -> Result<EntryId, LedgerError> {
        let created = self
            .entries
            .create(scope.user_id().into_inner(), &entry)
            .await
            .map_err(|err| rejected(Some(scope.user_id()), err.into()))?;
        info!(
            user_id = %scope.user_id(),
            entry_id = %created.id,
            tags = entry.tags.len(),
            "Entry added"
        );
        Ok(EntryId::from_uuid(created.id))
    }

    async fn delete_entry(&self, scope: &UserScope, id: EntryId) -> Result<(), LedgerError> {
        self.entries
            .delete(scope.user_id().into_inner(), id.into_inner())
            .await
            .map_err(|err| rejected(Some(scope.user_id()), err.into()))?;
        info!(user_id = %scope.user_id(), entry_id = %id, "Entry deleted");
        Ok(())
    }

    async fn list_entries(
        &self,
        scope: &UserScope,
        filter: &EntryFilter,
    ) -> Result<Vec<Entry>, LedgerError> {
        let rows = self
            .entries
            .list(scope.user_id().into_inner(), filter)
            .await
            .map_err(database)?;
        Ok(rows.into_iter().map(entry_from_details).collect())
    }
}

// ============================================================================
// Row conversion
// ============================================================================

fn user_from_model(model: users::Model) -> User {
    User {
        id: UserId::from_uuid(model.id),
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        salt: model.salt,
        created: model.created_on,
    }
}

fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        name: model.name,
        account_type: model.account_type.into(),
        description: model.description,
    }
}

fn entry_from_details(details: EntryWithDetails) -> Entry {
    Entry {
        id: EntryId::from_uuid(details.entry.id),
        when: details.entry.entry_date,
        credit_account: details.credit_account,
        debit_account: details.debit_account,
        amount: Amount::from_minor_units(details.entry.amount_cents),
        who: details.entry.who,
        description: details.entry.description,
        tags: details.tags,
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Logs a write the ledger refused. Database failures are logged where they
/// are converted.
fn rejected(user_id: Option<UserId>, err: LedgerError) -> LedgerError {
    if !matches!(err, LedgerError::Database(_)) {
        match user_id {
            Some(user_id) => warn!(%user_id, code = err.error_code(), error = %err, "Write rejected"),
            None => warn!(code = err.error_code(), error = %err, "Write rejected"),
        }
    }
    err
}

fn database(err: DbErr) -> LedgerError {
    error!(error = %err, "Database error");
    LedgerError::Database(err.to_string())
}

impl From<UserError> for LedgerError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail(email) => Self::DuplicateUser(email),
            UserError::Database(err) => database(err),
        }
    }
}

impl From<AccountError> for LedgerError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Duplicate { name, account_type } => {
                Self::DuplicateAccount { name, account_type }
            }
            AccountError::Database(err) => database(err),
        }
    }
}

impl From<EntryError> for LedgerError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::AccountNotFound(name) => Self::AccountNotFound(name),
            EntryError::AmbiguousAccount(name) => Self::AmbiguousAccount(name),
            EntryError::SameAccount(name) => Self::SameAccount(name),
            EntryError::NotFound(id) => Self::EntryNotFound(EntryId::from_uuid(id)),
            EntryError::Database(err) => database(err),
        }
    }
}
