//! User repository for database operations.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use budgie_core::ledger::NewUser;

use super::is_unique_violation;
use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Email already registered.
    #[error("User with email '{0}' already exists")]
    DuplicateEmail(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// User repository for registration and lookup.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by exact email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
    }

    /// Registers a new user.
    ///
    /// The unique index on `email` decides races between concurrent
    /// registrations.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the email is taken, or a database error.
    pub async fn create(&self, input: &NewUser) -> Result<users::Model, UserError> {
        let user = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            email: Set(input.email.clone()),
            name: Set(input.name.clone()),
            password_hash: Set(input.password_hash.clone()),
            salt: Set(input.salt.clone()),
            created_on: Set(input.created),
        };

        user.insert(&self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                UserError::DuplicateEmail(input.email.clone())
            } else {
                UserError::Database(err)
            }
        })
    }
}
