//! Password policy enforced at signup.

use thiserror::Error;

/// A password rule that was not satisfied.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain a digit")]
    MissingDigit,
    #[error("password must not contain whitespace")]
    ContainsWhitespace,
}

/// Signup password requirements.
///
/// Rules are checked in order and the first failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters (not bytes).
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    /// Check a candidate password against the policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`PasswordPolicyError`] the password violates.
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
            });
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if password.chars().any(char::is_whitespace) {
            return Err(PasswordPolicyError::ContainsWhitespace);
        }
        Ok(())
    }
}
