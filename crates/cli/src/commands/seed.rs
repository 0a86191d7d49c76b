//! Seed the product catalog from a YAML file.
//!
//! The API only reads products, so this is how the catalog gets filled.
//! Rows are matched on `name`: existing products are updated in place and
//! keep their ids, so carts and past purchases stay valid.
//!
//! ```yaml
//! products:
//!   - name: Low-Poly Fox
//!     description: Faceted fox figurine printed in PLA.
//!     cost: 24.99
//!     image_filename: fox.png
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{error, info};

use dimensional_designs_storefront::db;

use super::database_url;

/// Top-level seed file layout.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<ProductSeed>,
}

/// One product entry in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductSeed {
    pub name: String,
    pub description: String,
    pub cost: Decimal,
    pub image_filename: String,
}

impl ProductSeed {
    /// Problems with this entry, empty when it is valid.
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name is blank".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push(format!("{}: description is blank", self.name));
        }
        if self.cost.is_sign_negative() {
            problems.push(format!("{}: cost is negative", self.name));
        }
        if self.image_filename.trim().is_empty() || self.image_filename.contains(['/', '\\']) {
            problems.push(format!("{}: image_filename must be a bare file name", self.name));
        }
        problems
    }
}

/// Validate a parsed catalog, returning every problem found.
#[must_use]
pub fn validate_catalog(catalog: &CatalogFile) -> Vec<String> {
    let mut problems: Vec<String> = catalog
        .products
        .iter()
        .flat_map(ProductSeed::problems)
        .collect();

    let mut names: Vec<&str> = catalog.products.iter().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    for pair in names.windows(2) {
        if let [a, b] = pair
            && a == b
        {
            problems.push(format!("{a}: duplicate name"));
        }
    }

    problems
}

/// Upsert products from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML catalog
/// * `clear_existing` - If true, delete all products first (fails if any
///   purchase references them)
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or a database
/// operation fails. All writes share one transaction.
pub async fn products(
    file_path: &str,
    clear_existing: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    let problems = validate_catalog(&catalog);
    if !problems.is_empty() {
        error!("Catalog validation failed:");
        for problem in &problems {
            error!("  - {problem}");
        }
        return Err(format!("{} validation errors found", problems.len()).into());
    }

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let mut tx = pool.begin().await?;

    if clear_existing {
        let deleted = sqlx::query("DELETE FROM product")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        info!(deleted, "Cleared existing products");
    }

    for product in &catalog.products {
        sqlx::query(
            r"
            INSERT INTO product (name, description, cost, image_filename)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
            SET description = EXCLUDED.description,
                cost = EXCLUDED.cost,
                image_filename = EXCLUDED.image_filename
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.cost)
        .bind(&product.image_filename)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(products = catalog.products.len(), "Seeding complete");
    Ok(())
}
