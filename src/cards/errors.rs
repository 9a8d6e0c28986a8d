//! Card error types

use thiserror::Error;

/// Errors raised while validating, scheduling or persisting cards
#[derive(Debug, Error)]
pub enum CardError {
    #[error("Invalid outcome '{0}': expected 'pass' or 'fail'")]
    InvalidOutcome(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Title is required.")]
    MissingTitle,

    #[error("Card not found: {0}")]
    CardNotFound(i64),

    #[error("Card {card_id} was changed by another review (expected version {expected}, found {actual})")]
    Conflict {
        card_id: i64,
        expected: i64,
        actual: i64,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Database(#[from] crate::database::DatabaseError),
}

/// Result type alias for card operations
pub type CardResult<T> = Result<T, CardError>;
