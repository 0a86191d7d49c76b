//! Product catalog service.

use sqlx::PgPool;
use thiserror::Error;

use dimensional_designs_core::{ProductId, ProductIdError};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::Product;

/// Errors that can occur while reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The id is not a plain decimal number.
    #[error("invalid product id")]
    InvalidId,

    /// No product has this id.
    #[error("product not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Read-only access to the product catalog.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.list().await?)
    }

    /// Look up one product by the textual id from the request path.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidId` for non-numeric ids,
    /// `CatalogError::NotFound` if no row matches, and
    /// `CatalogError::Repository` if the query fails.
    pub async fn get_product(&self, raw_id: &str) -> Result<Product, CatalogError> {
        let id = match ProductId::parse(raw_id) {
            Ok(id) => id,
            Err(ProductIdError::Malformed) => return Err(CatalogError::InvalidId),
            // Numeric but wider than the id column: no row can match.
            Err(ProductIdError::OutOfRange) => return Err(CatalogError::NotFound),
        };

        self.products.get(id).await?.ok_or(CatalogError::NotFound)
    }
}
