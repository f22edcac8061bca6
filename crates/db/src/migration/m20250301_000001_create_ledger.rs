//! Initial ledger schema.
//!
//! Users own accounts, entries and tags. Entries reference two accounts
//! (credit and debit) and link to tags through `entry_tags`. Uniqueness is
//! enforced by indexes so concurrent inserts race safely:
//! - `users.email`
//! - `accounts (user_id, name, account_type)`
//! - `tags (user_id, label)`
//! - `entry_tags (entry_id, tag_id)`

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ========== Users ==========
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Salt).string().not_null())
                    .col(ColumnDef::new(Users::CreatedOn).date().not_null())
                    .to_owned(),
            )
            .await?;

        // ========== Accounts ==========
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::UserId).uuid().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Accounts::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_user")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_user_name_type")
                    .table(Accounts::Table)
                    .col(Accounts::UserId)
                    .col(Accounts::Name)
                    .col(Accounts::AccountType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ========== Entries ==========
        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Entries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Entries::UserId).uuid().not_null())
                    .col(ColumnDef::new(Entries::EntryDate).date().not_null())
                    .col(ColumnDef::new(Entries::Who).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Entries::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Entries::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Entries::CreditAccountId).uuid().not_null())
                    .col(ColumnDef::new(Entries::DebitAccountId).uuid().not_null())
                    .check(
                        Expr::col(Entries::CreditAccountId)
                            .ne(Expr::col(Entries::DebitAccountId)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entries_user")
                            .from(Entries::Table, Entries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entries_credit_account")
                            .from(Entries::Table, Entries::CreditAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entries_debit_account")
                            .from(Entries::Table, Entries::DebitAccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entries_user_date")
                    .table(Entries::Table)
                    .col(Entries::UserId)
                    .col(Entries::EntryDate)
                    .to_owned(),
            )
            .await?;

        // ========== Tags ==========
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tags::UserId).uuid().not_null())
                    .col(ColumnDef::new(Tags::Label).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tags_user")
                            .from(Tags::Table, Tags::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tags_user_label")
                    .table(Tags::Table)
                    .col(Tags::UserId)
                    .col(Tags::Label)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ========== Entry tags ==========
        manager
            .create_table(
                Table::create()
                    .table(EntryTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EntryTags::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(EntryTags::UserId).uuid().not_null())
                    .col(ColumnDef::new(EntryTags::EntryId).uuid().not_null())
                    .col(ColumnDef::new(EntryTags::TagId).uuid().not_null())
                    .col(ColumnDef::new(EntryTags::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_tags_entry")
                            .from(EntryTags::Table, EntryTags::EntryId)
                            .to(Entries::Table, Entries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_tags_tag")
                            .from(EntryTags::Table, EntryTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entry_tags_user")
                            .from(EntryTags::Table, EntryTags::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entry_tags_entry_tag")
                    .table(EntryTags::Table)
                    .col(EntryTags::EntryId)
                    .col(EntryTags::TagId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entry_tags_tag")
                    .table(EntryTags::Table)
                    .col(EntryTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntryTags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Entries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    Salt,
    CreatedOn,
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Id,
    UserId,
    Name,
    AccountType,
    Description,
}

#[derive(DeriveIden)]
enum Entries {
    Table,
    Id,
    UserId,
    EntryDate,
    Who,
    Description,
    AmountCents,
    CreditAccountId,
    DebitAccountId,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    UserId,
    Label,
}

#[derive(DeriveIden)]
enum EntryTags {
    Table,
    Id,
    UserId,
    EntryId,
    TagId,
    Position,
}
