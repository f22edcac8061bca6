//! Account repository for a user's accounts.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use budgie_core::ledger::{AccountFilter, AccountRef, AccountType as LedgerAccountType, NewAccount};

use super::is_unique_violation;
use crate::entities::{accounts, sea_orm_active_enums::AccountType};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// The user already has an account with this name and type.
    #[error("Account '{name}' of type {account_type} already exists")]
    Duplicate {
        /// Account name.
        name: String,
        /// Account role.
        account_type: LedgerAccountType,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` when (user, name, type) is taken, or a database error.
    pub async fn create(
        &self,
        user_id: Uuid,
        input: &NewAccount,
    ) -> Result<accounts::Model, AccountError> {
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            name: Set(input.name.clone()),
            account_type: Set(AccountType::from(input.account_type)),
            description: Set(input.description.clone()),
        };

        account.insert(&self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                AccountError::Duplicate {
                    name: input.name.clone(),
                    account_type: input.account_type,
                }
            } else {
                AccountError::Database(err)
            }
        })
    }

    /// Lists the user's accounts matching `filter`, ordered by name then type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &AccountFilter,
    ) -> Result<Vec<accounts::Model>, DbErr> {
        let mut query = accounts::Entity::find().filter(accounts::Column::UserId.eq(user_id));

        if let Some(kind) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(AccountType::from(kind)));
        }
        if let Some(name) = &filter.name {
            query = query.filter(accounts::Column::Name.eq(name.as_str()));
        }

        query
            .order_by_asc(accounts::Column::Name)
            .order_by_asc(accounts::Column::AccountType)
            .all(&self.db)
            .await
    }

    /// Finds the user's accounts a reference could mean.
    ///
    /// At most two rows are fetched: enough to tell "unique" from "ambiguous".
    pub(crate) async fn candidates<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        reference: &AccountRef,
    ) -> Result<Vec<accounts::Model>, DbErr> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id))
            .filter(accounts::Column::Name.eq(reference.name.as_str()));

        if let Some(kind) = reference.account_type {
            query = query.filter(accounts::Column::AccountType.eq(AccountType::from(kind)));
        }

        query
            .order_by_asc(accounts::Column::AccountType)
            .limit(2)
            .all(conn)
            .await
    }
}
