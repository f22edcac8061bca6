//! Query filters for accounts and entries.
//!
//! Absent criteria match everything. Filters can be built directly or parsed
//! from query-string pairs, where an empty value counts as absent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{Account, AccountType, Entry};
use super::validation::{ValidationErrors, account_type_message, parse_date};

/// Filter for listing entries.
///
/// Date bounds are inclusive. Account criteria compare against the account
/// name exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilter {
    /// Only entries debiting this account name.
    pub debit_account: Option<String>,
    /// Only entries crediting this account name.
    pub credit_account: Option<String>,
    /// Only entries on or after this date.
    pub from: Option<NaiveDate>,
    /// Only entries on or before this date.
    pub to: Option<NaiveDate>,
}

impl EntryFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to entries debiting `name`.
    #[must_use]
    pub fn debit_account(mut self, name: impl Into<String>) -> Self {
        self.debit_account = Some(name.into());
        self
    }

    /// Restricts to entries crediting `name`.
    #[must_use]
    pub fn credit_account(mut self, name: impl Into<String>) -> Self {
        self.credit_account = Some(name.into());
        self
    }

    /// Restricts to entries on or after `date`.
    #[must_use]
    pub const fn since(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    /// Restricts to entries on or before `date`.
    #[must_use]
    pub const fn until(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    /// Returns true if the filter is empty (matches everything).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.debit_account.is_none()
            && self.credit_account.is_none()
            && self.from.is_none()
            && self.to.is_none()
    }

    /// Returns true if `entry` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, entry: &Entry) -> bool {
        self.debit_account
            .as_ref()
            .is_none_or(|name| *name == entry.debit_account)
            && self
                .credit_account
                .as_ref()
                .is_none_or(|name| *name == entry.credit_account)
            && self.from.is_none_or(|from| entry.when >= from)
            && self.to.is_none_or(|to| entry.when <= to)
    }

    /// Parses query-string pairs. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns per-field errors for dates that are not `YYYY-MM-DD`.
    pub fn from_params<'a, I>(params: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        let mut errors = ValidationErrors::new();

        for (key, value) in params {
            if value.is_empty() {
                continue;
            }
            match key {
                "debit_account" => filter.debit_account = Some(value.to_string()),
                "credit_account" => filter.credit_account = Some(value.to_string()),
                "from" | "to" => match parse_date(value) {
                    Some(date) if key == "from" => filter.from = Some(date),
                    Some(date) => filter.to = Some(date),
                    None => errors.add(key, "Not a valid date."),
                },
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(errors)
        }
    }
}

/// Filter for listing accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFilter {
    /// Only accounts with this role.
    pub account_type: Option<AccountType>,
    /// Only accounts with exactly this name.
    pub name: Option<String>,
}

impl AccountFilter {
    /// Creates a new empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to accounts of `account_type`.
    #[must_use]
    pub const fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    /// Restricts to accounts named `name`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns true if the filter is empty (matches everything).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.account_type.is_none() && self.name.is_none()
    }

    /// Returns true if `account` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        self.account_type
            .is_none_or(|kind| kind == account.account_type)
            && self.name.as_ref().is_none_or(|name| *name == account.name)
    }

    /// Parses query-string pairs (`type`, `name`). Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns a field error when `type` is not an account role.
    pub fn from_params<'a, I>(params: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        let mut errors = ValidationErrors::new();

        for (key, value) in params {
            if value.is_empty() {
                continue;
            }
            match key {
                "type" => match value.parse() {
                    Ok(kind) => filter.account_type = Some(kind),
                    Err(_) => errors.add("type", account_type_message()),
                },
                "name" => filter.name = Some(value.to_string()),
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(filter)
        } else {
            Err(errors)
        }
    }
}
