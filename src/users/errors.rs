//! Account error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password are required.")]
    MissingCredentials,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(&'static str),

    #[error("Email already registered.")]
    EmailTaken,

    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("Not logged in")]
    Unauthenticated,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Database(#[from] crate::database::DatabaseError),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hash(err.to_string())
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
