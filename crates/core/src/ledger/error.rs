//! Ledger error types.
//!
//! Every failure a store operation can report is one of these variants.
//! Validation failures are detected before the store is called; the rest are
//! detected by the store and never leave a partial write behind.

use budgie_shared::AppError;
use budgie_shared::types::EntryId;
use thiserror::Error;

use super::types::AccountType;
use super::validation::ValidationErrors;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Input Errors ==========
    /// Input failed field-level validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    // ========== Conflict Errors ==========
    /// An account with this name and type already exists for the user.
    #[error("Account '{name}' of type {account_type} already exists")]
    DuplicateAccount {
        /// Account name.
        name: String,
        /// Account role.
        account_type: AccountType,
    },

    /// A user with this email already exists.
    #[error("User with email '{0}' already exists")]
    DuplicateUser(String),

    /// An account name matches several accounts and no type was given.
    #[error("Account name '{0}' is ambiguous; specify the account type")]
    AmbiguousAccount(String),

    /// Credit and debit resolve to the same account.
    #[error("Credit and debit account must differ, both are '{0}'")]
    SameAccount(String),

    // ========== Lookup Errors ==========
    /// An entry references an account that does not exist for the user.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// No such entry for the user.
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// No user with this email.
    #[error("User not found: {0}")]
    UserNotFound(String),

    // ========== Scope Errors ==========
    /// Identity could not be resolved to a user.
    #[error("Unauthorized")]
    Unauthorized,

    // ========== Storage Errors ==========
    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateAccount { .. } => "DUPLICATE_ACCOUNT",
            Self::DuplicateUser(_) => "DUPLICATE_USER",
            Self::AmbiguousAccount(_) => "AMBIGUOUS_ACCOUNT",
            Self::SameAccount(_) => "SAME_ACCOUNT",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns true for not-found outcomes (account, entry or user).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::EntryNotFound(_) | Self::UserNotFound(_)
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Validation(_) | LedgerError::SameAccount(_) => Self::Validation(message),
            LedgerError::DuplicateAccount { .. }
            | LedgerError::DuplicateUser(_)
            | LedgerError::AmbiguousAccount(_) => Self::Conflict(message),
            LedgerError::AccountNotFound(_)
            | LedgerError::EntryNotFound(_)
            | LedgerError::UserNotFound(_) => Self::NotFound(message),
            LedgerError::Unauthorized => Self::Unauthorized(message),
            LedgerError::Database(_) => Self::Database(message),
        }
    }
}
