//! Enums stored as strings so the schema works on every backend.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use budgie_core::ledger::AccountType as LedgerAccountType;

/// Account role column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum AccountType {
    /// Expense account.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Income account.
    #[sea_orm(string_value = "income")]
    Income,
    /// Equity account.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Asset account.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability account.
    #[sea_orm(string_value = "liability")]
    Liability,
}

impl From<LedgerAccountType> for AccountType {
    fn from(value: LedgerAccountType) -> Self {
        match value {
            LedgerAccountType::Expense => Self::Expense,
            LedgerAccountType::Income => Self::Income,
            LedgerAccountType::Equity => Self::Equity,
            LedgerAccountType::Asset => Self::Asset,
            LedgerAccountType::Liability => Self::Liability,
        }
    }
}

impl From<AccountType> for LedgerAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Expense => Self::Expense,
            AccountType::Income => Self::Income,
            AccountType::Equity => Self::Equity,
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
        }
    }
}
