//! Checkout service.
//!
//! Turns a submitted purchase form into one order header plus one aggregated
//! line per distinct product. The cart arrives as the delimited wire string
//! (`"5,5,7"`) and is decoded into [`CartLines`] before anything is written.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use sqlx::PgPool;
use thiserror::Error;

use dimensional_designs_core::{CartError, CartLines, CustomerId};

use crate::db::{PurchaseRepository, RepositoryError};
use crate::models::{Invoice, NewPurchase, PaymentCard, Purchase, ShippingAddress};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A shipping, payment or invoice field is absent or blank.
    #[error("missing required fields")]
    MissingFields,

    /// The cart string could not be decoded.
    #[error("invalid cart: {0}")]
    InvalidCart(#[from] CartError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Purchase form as submitted by the client.
///
/// Every field is optional at the decoding stage so that absent and blank
/// values both surface as `MissingFields` rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PurchaseRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub credit_card: Option<String>,
    pub credit_expire: Option<String>,
    pub credit_cvv: Option<String>,
    pub cart: Option<String>,
    #[serde(deserialize_with = "optional_amount")]
    pub invoice_amt: Option<Decimal>,
    #[serde(deserialize_with = "optional_amount")]
    pub invoice_tax: Option<Decimal>,
    #[serde(deserialize_with = "optional_amount")]
    pub invoice_total: Option<Decimal>,
}

/// A purchase form whose fields are all present and whose cart decoded.
#[derive(Debug, Clone)]
pub struct ValidatedPurchase {
    pub shipping: ShippingAddress,
    pub payment: PaymentCard,
    pub invoice: Invoice,
    pub lines: CartLines,
}

impl ValidatedPurchase {
    /// Attach the purchasing customer, producing the row to insert.
    #[must_use]
    pub fn into_new_purchase(self, customer_id: CustomerId) -> (NewPurchase, CartLines) {
        (
            NewPurchase {
                customer_id,
                shipping: self.shipping,
                payment: self.payment,
                invoice: self.invoice,
            },
            self.lines,
        )
    }
}

impl PurchaseRequest {
    /// Check presence of every field and decode the cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingFields` if any shipping, payment or
    /// invoice field is absent or blank, and `CheckoutError::InvalidCart` if
    /// the cart string is empty or holds a non-numeric token.
    pub fn validate(self) -> Result<ValidatedPurchase, CheckoutError> {
        let shipping = ShippingAddress {
            street: required(self.street)?,
            city: required(self.city)?,
            province: required(self.province)?,
            country: required(self.country)?,
            postal_code: required(self.postal_code)?,
        };

        let payment = PaymentCard {
            credit_card: required(self.credit_card)?,
            credit_expire: required(self.credit_expire)?,
            credit_cvv: required(self.credit_cvv)?,
        };

        let invoice = Invoice {
            amount: self.invoice_amt.ok_or(CheckoutError::MissingFields)?,
            tax: self.invoice_tax.ok_or(CheckoutError::MissingFields)?,
            total: self.invoice_total.ok_or(CheckoutError::MissingFields)?,
        };

        let lines = CartLines::parse(self.cart.as_deref().unwrap_or_default())?;

        Ok(ValidatedPurchase {
            shipping,
            payment,
            invoice,
            lines,
        })
    }
}

fn required(value: Option<String>) -> Result<String, CheckoutError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(CheckoutError::MissingFields)
}

/// Accept an amount as a JSON number or numeric string. Blank and zero
/// amounts count as absent.
fn optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(Decimal),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n).filter(|n| !n.is_zero())),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<Decimal>()
            .map(|n| Some(n).filter(|n| !n.is_zero()))
            .map_err(serde::de::Error::custom),
    }
}

/// Records purchases for an authenticated customer.
pub struct CheckoutService<'a> {
    purchases: PurchaseRepository<'a>,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            purchases: PurchaseRepository::new(pool),
        }
    }

    /// Validate and persist a purchase for `customer_id`.
    ///
    /// The customer comes from the session, never from the request body.
    ///
    /// # Errors
    ///
    /// Returns validation errors before touching the database, and
    /// `CheckoutError::Repository` if the transactional insert fails.
    pub async fn purchase(
        &self,
        customer_id: CustomerId,
        request: PurchaseRequest,
    ) -> Result<Purchase, CheckoutError> {
        let (new_purchase, lines) = request.validate()?.into_new_purchase(customer_id);

        let purchase = self
            .purchases
            .create_with_items(&new_purchase, &lines)
            .await?;

        tracing::info!(
            purchase_id = %purchase.purchase_id,
            customer_id = %customer_id,
            lines = lines.len(),
            units = lines.total_units(),
            "Purchase recorded"
        );

        Ok(purchase)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use dimensional_designs_core::ProductId;
    use serde_json::json;

    fn full_body() -> serde_json::Value {
        json!({
            "street": "12 Elm St",
            "city": "Halifax",
            "province": "NS",
            "country": "Canada",
            "postal_code": "B3H 1A1",
            "credit_card": "4111111111111111",
            "credit_expire": "12/29",
            "credit_cvv": "123",
            "cart": "5,5,7",
            "invoice_amt": 30.5,
            "invoice_tax": "4.58",
            "invoice_total": 35.08
        })
    }

    fn request(body: serde_json::Value) -> PurchaseRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_validate_full_request() {
        let validated = request(full_body()).validate().unwrap();

        assert_eq!(validated.shipping.city, "Halifax");
        assert_eq!(validated.payment.credit_cvv, "123");
        assert_eq!(validated.invoice.amount, Decimal::new(305, 1));
        assert_eq!(validated.invoice.tax, Decimal::new(458, 2));
        assert_eq!(validated.invoice.total, Decimal::new(3508, 2));

        let lines: Vec<(i32, u32)> = validated
            .lines
            .lines()
            .iter()
            .map(|l| (l.product_id.as_i32(), l.quantity))
            .collect();
        assert_eq!(lines, vec![(5, 2), (7, 1)]);
    }

    #[test]
    fn test_validate_each_missing_field() {
        let fields = [
            "street",
            "city",
            "province",
            "country",
            "postal_code",
            "credit_card",
            "credit_expire",
            "credit_cvv",
            "invoice_amt",
            "invoice_tax",
            "invoice_total",
        ];

        for field in fields {
            let mut body = full_body();
            body.as_object_mut().unwrap().remove(field);
            assert!(
                matches!(request(body).validate(), Err(CheckoutError::MissingFields)),
                "missing {field} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_blank_field() {
        let mut body = full_body();
        body["street"] = json!("   ");
        assert!(matches!(
            request(body).validate(),
            Err(CheckoutError::MissingFields)
        ));

        let mut body = full_body();
        body["invoice_tax"] = json!("");
        assert!(matches!(
            request(body).validate(),
            Err(CheckoutError::MissingFields)
        ));
    }

    #[test]
    fn test_validate_zero_amount_is_missing() {
        for zero in [json!(0), json!(0.0), json!("0.00")] {
            let mut body = full_body();
            body["invoice_tax"] = zero.clone();
            assert!(
                matches!(request(body).validate(), Err(CheckoutError::MissingFields)),
                "{zero} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_bad_cart() {
        for cart in ["", "5,,7", "5,x"] {
            let mut body = full_body();
            body["cart"] = json!(cart);
            assert!(
                matches!(request(body).validate(), Err(CheckoutError::InvalidCart(_))),
                "{cart:?} should be rejected"
            );
        }

        let mut body = full_body();
        body.as_object_mut().unwrap().remove("cart");
        assert!(matches!(
            request(body).validate(),
            Err(CheckoutError::InvalidCart(CartError::Empty))
        ));
    }

    #[test]
    fn test_non_numeric_amount_is_a_decode_error() {
        let mut body = full_body();
        body["invoice_amt"] = json!("lots");
        assert!(serde_json::from_value::<PurchaseRequest>(body).is_err());
    }

    #[test]
    fn test_into_new_purchase_uses_given_customer() {
        let (new_purchase, lines) = request(full_body())
            .validate()
            .unwrap()
            .into_new_purchase(CustomerId::new(42));
        assert_eq!(new_purchase.customer_id, CustomerId::new(42));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.lines()[0].product_id, ProductId::new(5));
    }
}
