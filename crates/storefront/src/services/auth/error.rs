//! Authentication error types.

use thiserror::Error;

use dimensional_designs_core::{EmailError, PasswordPolicyError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more required fields were blank.
    #[error("required fields are missing")]
    MissingFields,

    /// Password does not satisfy the signup policy.
    #[error("password validation failed: {0}")]
    WeakPassword(#[from] PasswordPolicyError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Email is already registered.
    #[error("email already in use")]
    EmailTaken,

    /// No customer matches the email.
    #[error("customer not found")]
    CustomerNotFound,

    /// Password did not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
