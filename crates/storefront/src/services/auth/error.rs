//! Login and registration error taxonomies.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials. Deliberately covers both an unknown email and a
    /// wrong password so a caller cannot probe which one it was.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Errors that can occur during registration.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// A required field was empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] tradepost_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] tradepost_core::EmailError),

    /// The username or email is already registered. Deliberately does not
    /// say which.
    #[error("username or email already registered")]
    DuplicateIdentity,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}
