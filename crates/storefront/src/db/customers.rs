//! Customer repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dimensional_designs_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::Customer;

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    customer_id: i32,
    email: String,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: CustomerId::new(row.customer_id),
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
        })
    }
}

/// Customer row joined with its password hash (login only).
#[derive(Debug, sqlx::FromRow)]
struct CustomerWithPasswordRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    password: String,
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new customer.
    ///
    /// `password_hash` must already be a one-way hash; plaintext never
    /// reaches this layer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            INSERT INTO customer (email, password, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING customer_id, email, first_name, last_name, created_at
            ",
        )
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email already exists"))?;

        row.try_into()
    }

    /// Get a customer and their password hash by exact email match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerWithPasswordRow>(
            r"
            SELECT customer_id, email, first_name, last_name, created_at, password
            FROM customer
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let customer = Customer::try_from(r.customer)?;
        Ok(Some((customer, r.password)))
    }

    /// Count customers registered under an email (0 or 1).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_email(&self, email: &Email) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customer WHERE email = $1")
            .bind(email)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
