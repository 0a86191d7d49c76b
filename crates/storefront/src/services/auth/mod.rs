//! Authentication service.
//!
//! Password-based signup and login. Hashes are Argon2id PHC strings with a
//! fresh random salt per record, so equal passwords never share a hash.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use dimensional_designs_core::{Email, PasswordPolicy};

use crate::db::{CustomerRepository, RepositoryError};
use crate::models::Customer;

/// Authentication service.
pub struct AuthService<'a> {
    customers: CustomerRepository<'a>,
    policy: PasswordPolicy,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
            policy: PasswordPolicy::default(),
        }
    }

    /// Register a new customer.
    ///
    /// Every input check runs before the database is touched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is blank.
    /// Returns `AuthError::WeakPassword` if the password fails the policy.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Customer, AuthError> {
        if [email, password, first_name, last_name]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(AuthError::MissingFields);
        }

        self.policy.check(password)?;
        let email = Email::parse(email)?;

        let password_hash = hash_password(password)?;

        let customer = self
            .customers
            .create(&email, &password_hash, first_name, last_name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(customer_id = %customer.id, "Customer registered");

        Ok(customer)
    }

    /// Verify an email and password pair.
    ///
    /// An unknown email and a wrong password are reported separately.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if either field is blank.
    /// Returns `AuthError::CustomerNotFound` if no customer has this email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        // A malformed address cannot belong to anyone.
        let email = Email::parse(email).map_err(|_| AuthError::CustomerNotFound)?;

        let (customer, password_hash) = self
            .customers
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::CustomerNotFound)?;

        verify_password(password, &password_hash)?;

        Ok(customer)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the password does not match or
/// the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
