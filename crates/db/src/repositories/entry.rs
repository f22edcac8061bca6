//! Entry repository: double-entry movements and their tag links.
//!
//! Writes run in one database transaction. Account resolution, the entry row,
//! tag creation and tag links either all commit or all roll back.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::{Query, SelectStatement},
};
use uuid::Uuid;

use budgie_core::ledger::{AccountRef, EntryFilter, NewEntry};

use super::account::AccountRepository;
use super::tag::TagRepository;
use crate::entities::{accounts, entries, entry_tags, tags};

/// Error types for entry operations.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// A referenced account does not exist for the user.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// A referenced name matches several of the user's accounts.
    #[error("Account name '{0}' is ambiguous")]
    AmbiguousAccount(String),

    /// Credit and debit resolve to the same account.
    #[error("Credit and debit resolve to the same account '{0}'")]
    SameAccount(String),

    /// Entry not found for the user.
    #[error("Entry not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Entry with its account names and tag labels resolved.
#[derive(Debug, Clone)]
pub struct EntryWithDetails {
    /// The entry row.
    pub entry: entries::Model,
    /// Name of the credited account.
    pub credit_account: String,
    /// Name of the debited account.
    pub debit_account: String,
    /// Tag labels in the order they were given.
    pub tags: Vec<String>,
}

/// Entry repository.
#[derive(Debug, Clone)]
pub struct EntryRepository {
    db: DatabaseConnection,
}

impl EntryRepository {
    /// Creates a new entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an entry, its tags and tag links in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `AmbiguousAccount` or `SameAccount` when
    /// the accounts cannot be resolved to two distinct rows; nothing is
    /// written in that case.
    pub async fn create(
        &self,
        user_id: Uuid,
        input: &NewEntry,
    ) -> Result<entries::Model, EntryError> {
        let txn = self.db.begin().await?;

        let credit = resolve_account(&txn, user_id, &input.credit_account).await?;
        let debit = resolve_account(&txn, user_id, &input.debit_account).await?;
        if credit.id == debit.id {
            return Err(EntryError::SameAccount(credit.name));
        }

        let entry = entries::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            entry_date: Set(input.when),
            who: Set(input.who.clone()),
            description: Set(input.description.clone()),
            amount_cents: Set(input.amount.minor_units()),
            credit_account_id: Set(credit.id),
            debit_account_id: Set(debit.id),
        }
        .insert(&txn)
        .await?;

        let mut linked = HashSet::new();
        let mut position = 0;
        for label in &input.tags {
            let tag = TagRepository::find_or_create(&txn, user_id, label).await?;
            if !linked.insert(tag.id) {
                continue;
            }

            entry_tags::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(user_id),
                entry_id: Set(entry.id),
                tag_id: Set(tag.id),
                position: Set(position),
            }
            .insert(&txn)
            .await?;
            position += 1;
        }

        txn.commit().await?;

        Ok(entry)
    }

    /// Deletes an entry and its tag links in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user has no entry with this id, including
    /// when a concurrent delete removed it first.
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), EntryError> {
        let txn = self.db.begin().await?;

        entry_tags::Entity::delete_many()
            .filter(entry_tags::Column::EntryId.eq(id))
            .filter(entry_tags::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        let deleted = entries::Entity::delete_many()
            .filter(entries::Column::Id.eq(id))
            .filter(entries::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        if deleted.rows_affected == 0 {
            return Err(EntryError::NotFound(id));
        }

        txn.commit().await?;

        Ok(())
    }

    /// Lists the user's entries matching `filter`, ordered by date then id.
    ///
    /// Rows, account names and tag labels are read in one transaction so the
    /// result is a consistent snapshot. The number of bound parameters does
    /// not grow with the number of entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &EntryFilter,
    ) -> Result<Vec<EntryWithDetails>, DbErr> {
        let txn = self.db.begin().await?;

        let selected = entry_condition(user_id, filter);

        let rows = entries::Entity::find()
            .filter(selected.clone())
            .order_by_asc(entries::Column::EntryDate)
            .order_by_asc(entries::Column::Id)
            .all(&txn)
            .await?;

        if rows.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let names = account_names(&txn, user_id).await?;
        let mut labels = tag_labels(&txn, user_id, selected).await?;

        txn.commit().await?;

        rows.into_iter()
            .map(|entry| {
                let name_of = |id: Uuid| {
                    names
                        .get(&id)
                        .cloned()
                        .ok_or_else(|| DbErr::RecordNotFound(format!("account {id}")))
                };
                Ok(EntryWithDetails {
                    credit_account: name_of(entry.credit_account_id)?,
                    debit_account: name_of(entry.debit_account_id)?,
                    tags: labels.remove(&entry.id).unwrap_or_default(),
                    entry,
                })
            })
            .collect()
    }
}

/// Resolves a reference to exactly one of the user's accounts.
async fn resolve_account(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    reference: &AccountRef,
) -> Result<accounts::Model, EntryError> {
    let mut candidates = AccountRepository::candidates(txn, user_id, reference).await?;
    match candidates.len() {
        0 => Err(EntryError::AccountNotFound(reference.to_string())),
        1 => candidates
            .pop()
            .ok_or_else(|| EntryError::AccountNotFound(reference.to_string())),
        _ => Err(EntryError::AmbiguousAccount(reference.name.clone())),
    }
}

/// Ids of the user's accounts called `name`.
fn account_ids_named(user_id: Uuid, name: &str) -> SelectStatement {
    Query::select()
        .column(accounts::Column::Id)
        .from(accounts::Entity)
        .and_where(accounts::Column::UserId.eq(user_id))
        .and_where(accounts::Column::Name.eq(name))
        .to_owned()
}

/// Predicate over `entries` selecting the user's rows that match `filter`.
fn entry_condition(user_id: Uuid, filter: &EntryFilter) -> Condition {
    let mut condition = Condition::all().add(entries::Column::UserId.eq(user_id));

    if let Some(name) = &filter.debit_account {
        condition = condition
            .add(entries::Column::DebitAccountId.in_subquery(account_ids_named(user_id, name)));
    }
    if let Some(name) = &filter.credit_account {
        condition = condition
            .add(entries::Column::CreditAccountId.in_subquery(account_ids_named(user_id, name)));
    }
    if let Some(from) = filter.from {
        condition = condition.add(entries::Column::EntryDate.gte(from));
    }
    if let Some(to) = filter.to {
        condition = condition.add(entries::Column::EntryDate.lte(to));
    }

    condition
}

async fn account_names(
    txn: &DatabaseTransaction,
    user_id: Uuid,
) -> Result<HashMap<Uuid, String>, DbErr> {
    Ok(accounts::Entity::find()
        .filter(accounts::Column::UserId.eq(user_id))
        .all(txn)
        .await?
        .into_iter()
        .map(|account| (account.id, account.name))
        .collect())
}

async fn tag_labels(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    selected: Condition,
) -> Result<HashMap<Uuid, Vec<String>>, DbErr> {
    let entry_ids = Query::select()
        .column(entries::Column::Id)
        .from(entries::Entity)
        .cond_where(selected)
        .to_owned();

    let links = entry_tags::Entity::find()
        .filter(entry_tags::Column::UserId.eq(user_id))
        .filter(entry_tags::Column::EntryId.in_subquery(entry_ids))
        .order_by_asc(entry_tags::Column::EntryId)
        .order_by_asc(entry_tags::Column::Position)
        .find_also_related(tags::Entity)
        .all(txn)
        .await?;

    let mut labels: HashMap<Uuid, Vec<String>> = HashMap::new();
    for (link, tag) in links {
        if let Some(tag) = tag {
            labels.entry(link.entry_id).or_default().push(tag.label);
        }
    }
    Ok(labels)
}
