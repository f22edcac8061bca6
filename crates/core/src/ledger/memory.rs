//! In-memory ledger store.
//!
//! Holds every user's ledger behind a single mutex. Each operation takes the
//! lock once and checks everything before its first write, so a failed
//! operation leaves no trace and concurrent ones serialize.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use budgie_shared::types::{AccountId, Amount, EntryId, TagId, UserId};

use super::error::LedgerError;
use super::filter::{AccountFilter, EntryFilter};
use super::store::LedgerStore;
use super::types::{Account, AccountRef, Entry, NewAccount, NewEntry, NewUser, User};
use crate::session::UserScope;

#[derive(Debug, Clone)]
struct StoredAccount {
    user_id: UserId,
    account: Account,
}

#[derive(Debug, Clone)]
struct StoredTag {
    id: TagId,
    user_id: UserId,
    label: String,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    user_id: UserId,
    when: chrono::NaiveDate,
    credit_account_id: AccountId,
    debit_account_id: AccountId,
    amount: Amount,
    who: String,
    description: String,
    tag_ids: Vec<TagId>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    accounts: Vec<StoredAccount>,
    tags: Vec<StoredTag>,
    entries: BTreeMap<EntryId, StoredEntry>,
}

impl State {
    fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts
            .iter()
            .map(|stored| &stored.account)
            .find(|account| account.id == id)
    }

    fn tag_label(&self, id: TagId) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.id == id)
            .map(|tag| tag.label.as_str())
    }

    /// Resolves a name (and optional type) to exactly one of the user's accounts.
    fn resolve(&self, user_id: UserId, reference: &AccountRef) -> Result<AccountId, LedgerError> {
        let mut matches = self
            .accounts
            .iter()
            .filter(|stored| stored.user_id == user_id && reference.matches(&stored.account));

        match (matches.next(), matches.next()) {
            (Some(stored), None) => Ok(stored.account.id),
            (None, _) => Err(LedgerError::AccountNotFound(reference.to_string())),
            (Some(_), Some(_)) => Err(LedgerError::AmbiguousAccount(reference.name.clone())),
        }
    }

    /// Returns the user's tag for `label`, creating it if absent.
    fn tag_for(&mut self, user_id: UserId, label: &str) -> TagId {
        if let Some(tag) = self
            .tags
            .iter()
            .find(|tag| tag.user_id == user_id && tag.label == label)
        {
            return tag.id;
        }

        let id = TagId::new();
        self.tags.push(StoredTag {
            id,
            user_id,
            label: label.to_string(),
        });
        id
    }

    fn hydrate(&self, id: EntryId, stored: &StoredEntry) -> Result<Entry, LedgerError> {
        let account_name = |account_id: AccountId| {
            self.account(account_id)
                .map(|account| account.name.clone())
                .ok_or_else(|| LedgerError::Database(format!("dangling account {account_id}")))
        };

        Ok(Entry {
            id,
            when: stored.when,
            credit_account: account_name(stored.credit_account_id)?,
            debit_account: account_name(stored.debit_account_id)?,
            amount: stored.amount,
            who: stored.who.clone(),
            description: stored.description.clone(),
            tags: stored
                .tag_ids
                .iter()
                .filter_map(|tag_id| self.tag_label(*tag_id).map(str::to_string))
                .collect(),
        })
    }
}

/// Ledger store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: Mutex<State>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct tags stored for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the lock is poisoned.
    pub fn tag_count(&self, user_id: UserId) -> Result<usize, LedgerError> {
        Ok(self
            .lock()?
            .tags
            .iter()
            .filter(|tag| tag.user_id == user_id)
            .count())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Database("ledger state lock poisoned".to_string()))
    }
}

impl LedgerStore for MemoryLedgerStore {
    async fn create_user(&self, user: NewUser) -> Result<UserId, LedgerError> {
        let mut state = self.lock()?;
        if state.users.iter().any(|existing| existing.email == user.email) {
            return Err(LedgerError::DuplicateUser(user.email));
        }

        let id = UserId::new();
        state.users.push(User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            salt: user.salt,
            created: user.created,
        });
        debug!(user_id = %id, "User created");
        Ok(id)
    }

    async fn get_user(&self, email: &str) -> Result<User, LedgerError> {
        self.lock()?
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned()
            .ok_or_else(|| LedgerError::UserNotFound(email.to_string()))
    }

    async fn create_account(
        &self,
        scope: &UserScope,
        account: NewAccount,
    ) -> Result<AccountId, LedgerError> {
        let mut state = self.lock()?;
        let user_id = scope.user_id();
        let taken = state.accounts.iter().any(|stored| {
            stored.user_id == user_id
                && stored.account.name == account.name
                && stored.account.account_type == account.account_type
        });
        if taken {
            return Err(LedgerError::DuplicateAccount {
                name: account.name,
                account_type: account.account_type,
            });
        }

        let id = AccountId::new();
        state.accounts.push(StoredAccount {
            user_id,
            account: Account {
                id,
                name: account.name,
                account_type: account.account_type,
                description: account.description,
            },
        });
        debug!(%user_id, account_id = %id, "Account created");
        Ok(id)
    }

    async fn list_accounts(
        &self,
        scope: &UserScope,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, LedgerError> {
        let state = self.lock()?;
        let mut accounts: Vec<Account> = state
            .accounts
            .iter()
            .filter(|stored| stored.user_id == scope.user_id() && filter.matches(&stored.account))
            .map(|stored| stored.account.clone())
            .collect();
        accounts.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.account_type.as_str().cmp(b.account_type.as_str()))
        });
        Ok(accounts)
    }

    async fn add_entry(&self, scope: &UserScope, entry: NewEntry) -> Result<EntryId, LedgerError> {
        let mut state = self.lock()?;
        let user_id = scope.user_id();

        let credit_account_id = state.resolve(user_id, &entry.credit_account)?;
        let debit_account_id = state.resolve(user_id, &entry.debit_account)?;
        if credit_account_id == debit_account_id {
            return Err(LedgerError::SameAccount(entry.credit_account.name));
        }

        let mut tag_ids: Vec<TagId> = Vec::with_capacity(entry.tags.len());
        for label in &entry.tags {
            let tag_id = state.tag_for(user_id, label);
            if !tag_ids.contains(&tag_id) {
                tag_ids.push(tag_id);
            }
        }

        let id = EntryId::new();
        state.entries.insert(
            id,
            StoredEntry {
                user_id,
                when: entry.when,
                credit_account_id,
                debit_account_id,
                amount: entry.amount,
                who: entry.who,
                description: entry.description,
                tag_ids,
            },
        );
        debug!(%user_id, entry_id = %id, "Entry added");
        Ok(id)
    }

    async fn delete_entry(&self, scope: &UserScope, id: EntryId) -> Result<(), LedgerError> {
        let mut state = self.lock()?;
        let owned = state
            .entries
            .get(&id)
            .is_some_and(|stored| stored.user_id == scope.user_id());
        if !owned {
            return Err(LedgerError::EntryNotFound(id));
        }

        state.entries.remove(&id);
        debug!(user_id = %scope.user_id(), entry_id = %id, "Entry deleted");
        Ok(())
    }

    async fn list_entries(
        &self,
        scope: &UserScope,
        filter: &EntryFilter,
    ) -> Result<Vec<Entry>, LedgerError> {
        let state = self.lock()?;
        let mut entries = Vec::new();
        for (id, stored) in &state.entries {
            if stored.user_id != scope.user_id() {
                continue;
            }
            let entry = state.hydrate(*id, stored)?;
            if filter.matches(&entry) {
                entries.push(entry);
            }
        }
        entries.sort_by(|a, b| a.when.cmp(&b.when).then(a.id.cmp(&b.id)));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::AccountType;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
            created: date(2024, 1, 1),
        }
    }

    fn account(name: &str, account_type: AccountType) -> NewAccount {
        NewAccount {
            name: name.to_string(),
            account_type,
            description: String::new(),
        }
    }

    fn entry(when: NaiveDate, credit: &str, debit: &str, cents: i64, tags: &[&str]) -> NewEntry {
        NewEntry {
            when,
            credit_account: AccountRef::named(credit),
            debit_account: AccountRef::named(debit),
            amount: Amount::from_minor_units(cents),
            who: String::new(),
            description: String::new(),
            tags: tags.iter().map(ToString::to_string).collect(),
        }
    }

    async fn setup(store: &MemoryLedgerStore, email: &str) -> UserScope {
        store.create_user(new_user(email)).await.unwrap();
        let user = store.get_user(email).await.unwrap();
        let scope = UserScope::from_user(&user);
        store
            .create_account(&scope, account("bank", AccountType::Asset))
            .await
            .unwrap();
        store
            .create_account(&scope, account("groceries", AccountType::Expense))
            .await
            .unwrap();
        scope
    }

    #[tokio::test]
    async fn test_duplicate_user() {
        let store = MemoryLedgerStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();
        let err = store.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateUser(email) if email == "a@example.com"));
    }

    #[tokio::test]
    async fn test_get_user_is_case_sensitive() {
        let store = MemoryLedgerStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();
        let err = store.get_user("A@example.com").await.unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_account_per_type() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;

        let err = store
            .create_account(&scope, account("bank", AccountType::Asset))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateAccount { .. }));

        store
            .create_account(&scope, account("bank", AccountType::Liability))
            .await
            .unwrap();
        let banks = store
            .list_accounts(&scope, &AccountFilter::new().name("bank"))
            .await
            .unwrap();
        assert_eq!(banks.len(), 2);
    }

    #[tokio::test]
    async fn test_add_and_list_entry() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;

        let id = store
            .add_entry(&scope, entry(date(2024, 2, 15), "bank", "groceries", 4210, &["food"]))
            .await
            .unwrap();

        let entries = store.list_entries(&scope, &EntryFilter::new()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].credit_account, "bank");
        assert_eq!(entries[0].debit_account, "groceries");
        assert_eq!(entries[0].amount.to_string(), "42.10");
        assert_eq!(entries[0].tags, ["food"]);
    }

    #[tokio::test]
    async fn test_missing_account_leaves_nothing() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;

        let err = store
            .add_entry(&scope, entry(date(2024, 1, 1), "bank", "rent", 100, &["new-tag"]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound(name) if name == "rent"));
        assert!(store.list_entries(&scope, &EntryFilter::new()).await.unwrap().is_empty());
        assert_eq!(store.tag_count(scope.user_id()).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ambiguous_account_requires_type() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;
        store
            .create_account(&scope, account("bank", AccountType::Liability))
            .await
            .unwrap();

        let err = store
            .add_entry(&scope, entry(date(2024, 1, 1), "bank", "groceries", 100, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AmbiguousAccount(name) if name == "bank"));

        let mut typed = entry(date(2024, 1, 1), "bank", "groceries", 100, &[]);
        typed.credit_account = AccountRef::typed("bank", AccountType::Asset);
        store.add_entry(&scope, typed).await.unwrap();
    }

    #[tokio::test]
    async fn test_same_account_rejected() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;

        let mut same = entry(date(2024, 1, 1), "bank", "bank", 100, &[]);
        same.debit_account = AccountRef::typed("bank", AccountType::Asset);
        let err = store.add_entry(&scope, same).await.unwrap_err();
        assert!(matches!(err, LedgerError::SameAccount(_)));
    }

    #[tokio::test]
    async fn test_tags_are_shared_per_user() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;

        for day in [1, 2] {
            store
                .add_entry(&scope, entry(date(2024, 1, day), "bank", "groceries", 100, &["food"]))
                .await
                .unwrap();
        }

        assert_eq!(store.tag_count(scope.user_id()).unwrap(), 1);
        let entries = store.list_entries(&scope, &EntryFilter::new()).await.unwrap();
        assert!(entries.iter().all(|e| e.tags == ["food"]));
    }

    #[tokio::test]
    async fn test_delete_entry_twice() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;
        let id = store
            .add_entry(&scope, entry(date(2024, 1, 1), "bank", "groceries", 100, &["food"]))
            .await
            .unwrap();

        store.delete_entry(&scope, id).await.unwrap();
        assert!(store.list_entries(&scope, &EntryFilter::new()).await.unwrap().is_empty());

        let err = store.delete_entry(&scope, id).await.unwrap_err();
        assert!(matches!(err, LedgerError::EntryNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_date_range_filter() {
        let store = MemoryLedgerStore::new();
        let scope = setup(&store, "a@example.com").await;
        for when in [date(2024, 1, 1), date(2024, 2, 15), date(2024, 3, 1)] {
            store
                .add_entry(&scope, entry(when, "bank", "groceries", 100, &[]))
                .await
                .unwrap();
        }

        let filter = EntryFilter::new()
            .since(date(2024, 2, 1))
            .until(date(2024, 2, 28));
        let entries = store.list_entries(&scope, &filter).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].when, date(2024, 2, 15));
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let store = MemoryLedgerStore::new();
        let alice = setup(&store, "alice@example.com").await;
        let bob = setup(&store, "bob@example.com").await;

        let id = store
            .add_entry(&alice, entry(date(2024, 1, 1), "bank", "groceries", 100, &["food"]))
            .await
            .unwrap();

        assert!(store.list_entries(&bob, &EntryFilter::new()).await.unwrap().is_empty());
        assert_eq!(store.tag_count(bob.user_id()).unwrap(), 0);
        let err = store.delete_entry(&bob, id).await.unwrap_err();
        assert!(matches!(err, LedgerError::EntryNotFound(_)));
        assert_eq!(
            store.list_entries(&alice, &EntryFilter::new()).await.unwrap().len(),
            1
        );
    }
}
