//! `SeaORM` Entity for entries table.
//!
//! An entry references `accounts` twice. The two sides are separate
//! relations and are always joined explicitly by column.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: Date,
    pub who: String,
    pub description: String,
    /// Amount in minor units (cents).
    pub amount_cents: i64,
    pub credit_account_id: Uuid,
    pub debit_account_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::CreditAccountId",
        to = "super::accounts::Column::Id"
    )]
    CreditAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::DebitAccountId",
        to = "super::accounts::Column::Id"
    )]
    DebitAccount,
    #[sea_orm(has_many = "super::entry_tags::Entity")]
    EntryTags,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::entry_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EntryTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
