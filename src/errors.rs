//! Unified error types for the finance tracker.
//!
//! Every fallible operation in the crate returns [`Result`]. Lookup failures carry the
//! identifier that was requested so callers can map them to user-facing messages.

use thiserror::Error;

/// All errors produced by the categorization, budget and storage layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Error surfaced by the database driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Malformed input rejected before any work was done
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Why the request was rejected
        message: String,
    },

    /// Amount that is not finite or outside the allowed range
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A category id does not resolve to a stored category
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// Requested category id
        id: i64,
    },

    /// A rule id does not resolve to a stored rule
    #[error("Categorization rule not found: {id}")]
    RuleNotFound {
        /// Requested rule id
        id: i64,
    },

    /// A budget id does not resolve to a stored budget
    #[error("Budget not found: {id}")]
    BudgetNotFound {
        /// Requested budget id
        id: i64,
    },

    /// A transaction id does not resolve to a stored transaction
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// No allocation exists for the budget/category pair
    #[error("No allocation for category {category_id} in budget {budget_id}")]
    AllocationNotFound {
        /// Budget that was searched
        budget_id: i64,
        /// Category that has no allocation in the budget
        category_id: i64,
    },
}

impl Error {
    /// Shorthand for building an [`Error::InvalidRequest`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
