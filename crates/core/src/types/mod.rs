//! Core types for Dimensional Designs.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod password;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use password::{PasswordPolicy, PasswordPolicyError};
pub use price::{CurrencyCode, Price};
