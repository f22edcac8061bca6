//! Ledger domain types.
//!
//! `New*` records are validated input ready for the store; the plain records
//! are what the store hands back, already scoped to one user.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use budgie_shared::types::{AccountId, Amount, EntryId, UserId};

/// Role of an account in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
    /// Owner's stake.
    Equity,
    /// Something owned.
    Asset,
    /// Something owed.
    Liability,
}

impl AccountType {
    /// Every role, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Expense,
        Self::Income,
        Self::Equity,
        Self::Asset,
        Self::Liability,
    ];

    /// Returns the lowercase name used in input and storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Equity => "equity",
            Self::Asset => "asset",
            Self::Liability => "liability",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown account type: {s}"))
    }
}

/// A validated user ready to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Unique login email (matched case-sensitively).
    pub email: String,
    /// Password hash produced by the caller.
    pub password_hash: String,
    /// Salt used for the hash.
    pub salt: String,
    /// Registration date.
    pub created: NaiveDate,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Stored password hash.
    #[serde(skip)]
    pub password_hash: String,
    /// Stored salt.
    #[serde(skip)]
    pub salt: String,
    /// Registration date.
    pub created: NaiveDate,
}

/// A validated account ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Account name.
    pub name: String,
    /// Account role.
    pub account_type: AccountType,
    /// Free-text description.
    pub description: String,
}

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Account name.
    pub name: String,
    /// Account role.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Free-text description.
    pub description: String,
}

/// Reference to an account by name, optionally narrowed by role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountRef {
    /// Account name.
    pub name: String,
    /// Role, required only when the name exists under several roles.
    pub account_type: Option<AccountType>,
}

impl AccountRef {
    /// References an account by name alone.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            account_type: None,
        }
    }

    /// References an account by name and role.
    #[must_use]
    pub fn typed(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            account_type: Some(account_type),
        }
    }

    /// Returns true if `account` is what this reference points at.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        account.name == self.name
            && self
                .account_type
                .is_none_or(|kind| kind == account.account_type)
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.account_type {
            Some(kind) => write!(f, "{} ({kind})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// A validated entry ready to be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Date of the movement.
    pub when: NaiveDate,
    /// Account the value leaves.
    pub credit_account: AccountRef,
    /// Account the value enters.
    pub debit_account: AccountRef,
    /// Amount moved.
    pub amount: Amount,
    /// Counterparty.
    pub who: String,
    /// Free-text description.
    pub description: String,
    /// Tag labels, without duplicates, in the order given.
    pub tags: Vec<String>,
}

/// A stored entry with its account names and tag labels resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Entry ID.
    pub id: EntryId,
    /// Date of the movement.
    pub when: NaiveDate,
    /// Name of the credited account.
    pub credit_account: String,
    /// Name of the debited account.
    pub debit_account: String,
    /// Amount moved.
    pub amount: Amount,
    /// Counterparty.
    pub who: String,
    /// Free-text description.
    pub description: String,
    /// Tag labels.
    pub tags: Vec<String>,
}
