//! Purchase (order header) and purchase item types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use dimensional_designs_core::{CustomerId, ProductId, PurchaseId};

/// Shipping address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub province: String,
    pub country: String,
    pub postal_code: String,
}

/// Payment card fields captured at checkout.
///
/// Stored as submitted. `Debug` masks the card number and CVV so the values
/// never reach logs.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCard {
    pub credit_card: String,
    pub credit_expire: String,
    pub credit_cvv: String,
}

impl std::fmt::Debug for PaymentCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentCard")
            .field("credit_card", &mask_card_number(&self.credit_card))
            .field("credit_expire", &self.credit_expire)
            .field("credit_cvv", &"[REDACTED]")
            .finish()
    }
}

fn mask_card_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let last_four: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();
    format!("****{last_four}")
}

/// Invoice amounts as submitted by the client.
///
/// Nothing checks that these agree with catalog prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Invoice {
    #[serde(rename = "invoice_amt", with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "invoice_tax", with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(rename = "invoice_total", with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// A validated purchase ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub customer_id: CustomerId,
    pub shipping: ShippingAddress,
    pub payment: PaymentCard,
    pub invoice: Invoice,
}

/// One completed order header.
///
/// Serializes flat, matching the `purchase` table's columns.
#[derive(Debug, Clone, Serialize)]
pub struct Purchase {
    pub purchase_id: PurchaseId,
    pub customer_id: CustomerId,
    #[serde(flatten)]
    pub shipping: ShippingAddress,
    #[serde(flatten)]
    pub payment: PaymentCard,
    #[serde(flatten)]
    pub invoice: Invoice,
    pub order_date: DateTime<Utc>,
}

/// One aggregated line of a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseItem {
    pub purchase_id: PurchaseId,
    pub product_id: ProductId,
    pub quantity: i32,
}
