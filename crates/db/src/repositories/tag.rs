//! Tag repository.
//!
//! Tags are unique per user by label. Creation is a conditional insert so
//! concurrent entries introducing the same label share one row.

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, sea_query::OnConflict,
};
use uuid::Uuid;

use crate::entities::tags;

/// Tag repository.
#[derive(Debug, Clone)]
pub struct TagRepository {
    db: DatabaseConnection,
}

impl TagRepository {
    /// Creates a new tag repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the user's tag for `label`, inserting it if it does not exist.
    ///
    /// Runs on whatever connection it is given, so callers pass their
    /// transaction to keep the tag and its links in one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn find_or_create<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        label: &str,
    ) -> Result<tags::Model, DbErr> {
        let tag = tags::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(user_id),
            label: Set(label.to_string()),
        };

        let inserted = tags::Entity::insert(tag)
            .on_conflict(
                OnConflict::columns([tags::Column::UserId, tags::Column::Label])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await;

        match inserted {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(err) => return Err(err),
        }

        tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id))
            .filter(tags::Column::Label.eq(label))
            .one(conn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("tag '{label}'")))
    }

    /// Lists the user's tags by label.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<tags::Model>, DbErr> {
        tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id))
            .order_by_asc(tags::Column::Label)
            .all(&self.db)
            .await
    }

    /// Counts the user's tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self, user_id: Uuid) -> Result<u64, DbErr> {
        tags::Entity::find()
            .filter(tags::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
    }
}
