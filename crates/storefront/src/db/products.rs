//! Product catalog repository (read-only).

use rust_decimal::Decimal;
use sqlx::PgPool;

use dimensional_designs_core::ProductId;

use super::RepositoryError;
use crate::models::Product;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: i32,
    name: String,
    description: String,
    cost: Decimal,
    image_filename: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            description: row.description,
            cost: row.cost,
            image_filename: row.image_filename,
        }
    }
}

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, name, description, cost, image_filename
            FROM product
            ORDER BY product_id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT product_id, name, description, cost, image_filename
            FROM product
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }
}
