//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod entries;
pub mod entry_tags;
pub mod sea_orm_active_enums;
pub mod tags;
pub mod users;
