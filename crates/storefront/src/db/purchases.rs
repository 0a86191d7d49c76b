//! Purchase repository.
//!
//! A purchase is written as one unit: the header row and every line-item row
//! share a single transaction, so a failure while inserting lines leaves no
//! header behind.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use dimensional_designs_core::{CartLines, CustomerId, ProductId, PurchaseId};

use super::RepositoryError;
use crate::models::{
    Invoice, NewPurchase, PaymentCard, Purchase, PurchaseItem, ShippingAddress,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    purchase_id: i32,
    customer_id: i32,
    street: String,
    city: String,
    province: String,
    country: String,
    postal_code: String,
    credit_card: String,
    credit_expire: String,
    credit_cvv: String,
    invoice_amt: Decimal,
    invoice_tax: Decimal,
    invoice_total: Decimal,
    order_date: DateTime<Utc>,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Self {
            purchase_id: PurchaseId::new(row.purchase_id),
            customer_id: CustomerId::new(row.customer_id),
            shipping: ShippingAddress {
                street: row.street,
                city: row.city,
                province: row.province,
                country: row.country,
                postal_code: row.postal_code,
            },
            payment: PaymentCard {
                credit_card: row.credit_card,
                credit_expire: row.credit_expire,
                credit_cvv: row.credit_cvv,
            },
            invoice: Invoice {
                amount: row.invoice_amt,
                tax: row.invoice_tax,
                total: row.invoice_total,
            },
            order_date: row.order_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PurchaseItemRow {
    purchase_id: i32,
    product_id: i32,
    quantity: i32,
}

impl From<PurchaseItemRow> for PurchaseItem {
    fn from(row: PurchaseItemRow) -> Self {
        Self {
            purchase_id: PurchaseId::new(row.purchase_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
        }
    }
}

const PURCHASE_COLUMNS: &str = "purchase_id, customer_id, street, city, province, country, \
     postal_code, credit_card, credit_expire, credit_cvv, invoice_amt, invoice_tax, \
     invoice_total, order_date";

// =============================================================================
// Repository
// =============================================================================

/// Repository for purchase database operations.
pub struct PurchaseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PurchaseRepository<'a> {
    /// Create a new purchase repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a purchase header and its aggregated lines atomically.
    ///
    /// The header is inserted first to obtain its generated id, then all lines
    /// go in with one multi-row insert. Any error drops the transaction
    /// uncommitted, which rolls back the header too.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement or the commit
    /// fails (including foreign-key violations for unknown products).
    pub async fn create_with_items(
        &self,
        purchase: &NewPurchase,
        lines: &CartLines,
    ) -> Result<Purchase, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let header = insert_header(&mut tx, purchase).await?;
        insert_items(&mut tx, header.purchase_id, lines).await?;

        tx.commit().await?;

        tracing::debug!(
            purchase_id = %header.purchase_id,
            customer_id = %header.customer_id,
            lines = lines.len(),
            "Purchase committed"
        );

        Ok(header)
    }

    /// Get a purchase header by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PurchaseId) -> Result<Option<Purchase>, RepositoryError> {
        let row = sqlx::query_as::<_, PurchaseRow>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchase WHERE purchase_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Purchase::from))
    }

    /// List the lines stored for a purchase, in product id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for(&self, id: PurchaseId) -> Result<Vec<PurchaseItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, PurchaseItemRow>(
            r"
            SELECT purchase_id, product_id, quantity
            FROM purchase_item
            WHERE purchase_id = $1
            ORDER BY product_id ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PurchaseItem::from).collect())
    }

    /// Count purchase headers owned by a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_customer(&self, customer_id: CustomerId) -> Result<i64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM purchase WHERE customer_id = $1")
                .bind(customer_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }
}

async fn insert_header(
    conn: &mut PgConnection,
    purchase: &NewPurchase,
) -> Result<Purchase, RepositoryError> {
    let row = sqlx::query_as::<_, PurchaseRow>(&format!(
        r"
        INSERT INTO purchase (
            customer_id, street, city, province, country, postal_code,
            credit_card, credit_expire, credit_cvv,
            invoice_amt, invoice_tax, invoice_total, order_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now())
        RETURNING {PURCHASE_COLUMNS}
        "
    ))
    .bind(purchase.customer_id)
    .bind(&purchase.shipping.street)
    .bind(&purchase.shipping.city)
    .bind(&purchase.shipping.province)
    .bind(&purchase.shipping.country)
    .bind(&purchase.shipping.postal_code)
    .bind(&purchase.payment.credit_card)
    .bind(&purchase.payment.credit_expire)
    .bind(&purchase.payment.credit_cvv)
    .bind(purchase.invoice.amount)
    .bind(purchase.invoice.tax)
    .bind(purchase.invoice.total)
    .fetch_one(&mut *conn)
    .await?;

    Ok(row.into())
}

async fn insert_items(
    conn: &mut PgConnection,
    purchase_id: PurchaseId,
    lines: &CartLines,
) -> Result<(), RepositoryError> {
    if lines.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("INSERT INTO purchase_item (purchase_id, product_id, quantity) ");
    builder.push_values(lines, |mut row, line| {
        row.push_bind(purchase_id)
            .push_bind(line.product_id)
            .push_bind(i32::try_from(line.quantity).unwrap_or(i32::MAX));
    });

    builder.build().execute(&mut *conn).await?;
    Ok(())
}
