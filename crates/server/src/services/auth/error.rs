//! Authentication error types.

use thiserror::Error;

use store_ratings_core::ValidationErrors;

use crate::db::RepositoryError;

/// Errors that can occur in the credential store and the token gate.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more fields failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Unknown email or wrong password. Deliberately the same for both.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The current password given for a password change is wrong.
    #[error("current password is incorrect")]
    IncorrectPassword,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Account not found.
    #[error("user not found")]
    UserNotFound,

    /// No bearer token on a request that needs one.
    #[error("missing bearer token")]
    MissingToken,

    /// Token malformed, badly signed, expired, or naming an unknown account.
    #[error("invalid token")]
    InvalidToken,

    /// Signing a token failed.
    #[error("token signing failed: {0}")]
    TokenCreation(#[source] jsonwebtoken::errors::Error),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
