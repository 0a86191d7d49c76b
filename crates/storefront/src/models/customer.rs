//! Customer domain type.

use chrono::{DateTime, Utc};

use dimensional_designs_core::{CustomerId, Email};

/// A registered account holder.
///
/// The password hash is deliberately not part of this type; it only leaves
/// the repository alongside a customer for verification at login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Login email, unique across customers.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
