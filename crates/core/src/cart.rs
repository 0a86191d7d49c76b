//! Shopping cart wire formats.
//!
//! Two representations of a cart exist:
//!
//! - [`Cart`] is the browser-held cart: a JSON array of
//!   `{"productId": .., "quantity": ..}` objects stored in the `cart` cookie
//!   and mutated entirely client-side.
//! - [`CartLines`] is what checkout persists: the cart string submitted with a
//!   purchase (`"5,5,7"`, one product id per unit) decoded into one line per
//!   distinct product.
//!
//! [`Cart::to_checkout_string`] and [`CartLines::parse`] are inverse views of
//! the same data.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::types::{CurrencyCode, Price, ProductId, ProductIdError};

/// Name of the cookie holding the client cart.
pub const CART_COOKIE_NAME: &str = "cart";

/// Delimiter between product id tokens in the checkout cart string.
pub const CART_DELIMITER: char = ',';

/// Errors decoding a checkout cart string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("cart is empty")]
    Empty,
    #[error("cart contains an empty product id at position {position}")]
    EmptyToken { position: usize },
    #[error("cart contains an invalid product id {token:?}")]
    InvalidToken { token: String },
}

// =============================================================================
// Client Cart
// =============================================================================

/// One entry of the client cart.
///
/// The browser client compares ids as strings, so `productId` is always
/// written back as a string even when it was read as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(
        rename = "productId",
        serialize_with = "product_id_as_string",
        deserialize_with = "product_id_from_string_or_number"
    )]
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The browser-held cart.
///
/// Items keep insertion order so the cart page renders lines in the order
/// they were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Decode a cart from its (possibly percent-encoded) cookie value.
    ///
    /// A missing, undecodable or malformed cookie yields an empty cart, the
    /// same as a first visit. Lines naming the same product are merged into
    /// the first of them.
    #[must_use]
    pub fn from_cookie(value: &str) -> Self {
        let decoded = urlencoding::decode(value).map_or_else(|_| value.into(), |v| v);
        serde_json::from_str::<Vec<CartItem>>(&decoded)
            .map(Self::merged)
            .unwrap_or_default()
    }

    fn merged(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items.into_iter().filter(|item| item.quantity > 0) {
            match cart
                .items
                .iter_mut()
                .find(|line| line.product_id == item.product_id)
            {
                Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Encode the cart as a cookie value.
    #[must_use]
    pub fn to_cookie(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "[]".to_owned());
        urlencoding::encode(&json).into_owned()
    }

    /// The cart's items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of a product currently in the cart (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Add one unit of a product.
    pub fn add(&mut self, product_id: ProductId) {
        match self.items.iter_mut().find(|item| item.product_id == product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                product_id,
                quantity: 1,
            }),
        }
    }

    /// Remove one unit of a product, dropping the line when it reaches zero.
    pub fn remove_one(&mut self, product_id: ProductId) {
        if let Some(pos) = self.items.iter().position(|item| item.product_id == product_id) {
            let remaining = self.items.get(pos).map_or(0, |item| item.quantity.saturating_sub(1));
            if remaining == 0 {
                self.items.remove(pos);
            } else if let Some(item) = self.items.get_mut(pos) {
                item.quantity = remaining;
            }
        }
    }

    /// Remove a product's line entirely.
    pub fn remove_all(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.product_id != product_id);
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of unit price x quantity, in the store currency.
    ///
    /// Lines whose price is unknown (the product lookup failed) contribute
    /// nothing.
    #[must_use]
    pub fn subtotal(&self, prices: &HashMap<ProductId, Price>) -> Price {
        let amount: Decimal = self
            .items
            .iter()
            .filter_map(|item| {
                prices
                    .get(&item.product_id)
                    .map(|price| price.times(item.quantity).amount)
            })
            .sum();
        Price::new(amount, CurrencyCode::default())
    }

    /// Flatten the cart into the checkout wire format: one product id token
    /// per unit, comma separated.
    #[must_use]
    pub fn to_checkout_string(&self) -> String {
        self.items
            .iter()
            .flat_map(|item| {
                std::iter::repeat_n(item.product_id.to_string(), item.quantity as usize)
            })
            .collect::<Vec<_>>()
            .join(&CART_DELIMITER.to_string())
    }
}

fn product_id_as_string<S>(product_id: &ProductId, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&product_id.to_string())
}

fn product_id_from_string_or_number<'de, D>(deserializer: D) -> Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(id) => Ok(ProductId::new(id)),
        Raw::Text(text) => ProductId::parse(&text).map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Checkout Cart Lines
// =============================================================================

/// One aggregated checkout line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A decoded checkout cart: one line per distinct product id, ordered by
/// ascending product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CartLines(Vec<CartLine>);

impl CartLines {
    /// Decode the comma-delimited checkout cart string.
    ///
    /// Each token is one unit of a product; repeated tokens are coalesced
    /// into a single line whose quantity is the occurrence count. Surrounding
    /// whitespace on a token is ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Empty` for a blank cart, `CartError::EmptyToken`
    /// for `"5,,7"`-style gaps and `CartError::InvalidToken` for anything that
    /// is not a product id.
    pub fn parse(cart: &str) -> Result<Self, CartError> {
        if cart.trim().is_empty() {
            return Err(CartError::Empty);
        }

        let mut counts: BTreeMap<ProductId, u32> = BTreeMap::new();
        for (position, raw) in cart.split(CART_DELIMITER).enumerate() {
            let token = raw.trim();
            if token.is_empty() {
                return Err(CartError::EmptyToken { position });
            }
            let product_id = ProductId::parse(token).map_err(|_: ProductIdError| {
                CartError::InvalidToken {
                    token: token.to_owned(),
                }
            })?;
            let quantity = counts.entry(product_id).or_insert(0);
            *quantity = quantity.saturating_add(1);
        }

        Ok(Self(
            counts
                .into_iter()
                .map(|(product_id, quantity)| CartLine {
                    product_id,
                    quantity,
                })
                .collect(),
        ))
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.0.iter().map(|line| line.quantity).sum()
    }
}

impl<'a> IntoIterator for &'a CartLines {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn line(id: i32, quantity: u32) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_cart_lines_coalesce_repeated_tokens() {
        let lines = CartLines::parse("3,3,3,8,8").unwrap();
        assert_eq!(lines.lines(), &[line(3, 3), line(8, 2)]);
        assert_eq!(lines.total_units(), 5);
    }

    #[test]
    fn test_cart_lines_interleaved_tokens() {
        let lines = CartLines::parse("7,5,7,5,5").unwrap();
        assert_eq!(lines.lines(), &[line(5, 3), line(7, 2)]);
    }

    #[test]
    fn test_cart_lines_single_unit() {
        let lines = CartLines::parse("5,5,7").unwrap();
        assert_eq!(lines.lines(), &[line(5, 2), line(7, 1)]);
        assert_eq!(CartLines::parse(" 12 ").unwrap().lines(), &[line(12, 1)]);
    }

    #[test]
    fn test_cart_lines_rejects_bad_input() {
        assert_eq!(CartLines::parse(""), Err(CartError::Empty));
        assert_eq!(CartLines::parse("  "), Err(CartError::Empty));
        assert_eq!(
            CartLines::parse("5,,7"),
            Err(CartError::EmptyToken { position: 1 })
        );
        assert_eq!(
            CartLines::parse("5,abc"),
            Err(CartError::InvalidToken {
                token: "abc".to_owned()
            })
        );
    }

    #[test]
    fn test_client_cart_add_and_remove() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(5));
        cart.add(ProductId::new(7));
        cart.add(ProductId::new(5));
        assert_eq!(cart.quantity_of(ProductId::new(5)), 2);
        assert_eq!(cart.total_items(), 3);

        cart.remove_one(ProductId::new(5));
        assert_eq!(cart.quantity_of(ProductId::new(5)), 1);
        cart.remove_one(ProductId::new(5));
        assert_eq!(cart.quantity_of(ProductId::new(5)), 0);
        assert_eq!(cart.items().len(), 1);

        cart.remove_all(ProductId::new(7));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_checkout_string_round_trips_to_lines() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(7));
        cart.add(ProductId::new(5));
        cart.add(ProductId::new(5));

        let wire = cart.to_checkout_string();
        assert_eq!(wire, "7,5,5");
        assert_eq!(
            CartLines::parse(&wire).unwrap().lines(),
            &[line(5, 2), line(7, 1)]
        );
    }

    #[test]
    fn test_cookie_accepts_string_and_numeric_ids() {
        let cart = Cart::from_cookie(r#"[{"productId":"5","quantity":2},{"productId":7,"quantity":1}]"#);
        assert_eq!(cart.quantity_of(ProductId::new(5)), 2);
        assert_eq!(cart.quantity_of(ProductId::new(7)), 1);
    }

    #[test]
    fn test_cookie_percent_encoded_value() {
        let cart = Cart::from_cookie("[{%22productId%22:3%2C%22quantity%22:4}]");
        assert_eq!(cart.quantity_of(ProductId::new(3)), 4);

        let reencoded = Cart::from_cookie(&cart.to_cookie());
        assert_eq!(reencoded, cart);
    }

    #[test]
    fn test_malformed_cookie_is_empty_cart() {
        assert!(Cart::from_cookie("not json").is_empty());
        assert!(Cart::from_cookie("").is_empty());
        assert!(Cart::from_cookie(r#"[{"productId":"x","quantity":1}]"#).is_empty());
    }

    #[test]
    fn test_subtotal_skips_unknown_prices() {
        let mut cart = Cart::new();
        cart.add(ProductId::new(1));
        cart.add(ProductId::new(1));
        cart.add(ProductId::new(2));

        let prices = HashMap::from([(
            ProductId::new(1),
            Price::new(Decimal::new(1250, 2), CurrencyCode::CAD),
        )]);
        let subtotal = cart.subtotal(&prices);
        assert_eq!(subtotal.amount, Decimal::new(2500, 2));
        assert_eq!(subtotal.display(), "$25.00");
    }

    #[test]
    fn test_cookie_string_ids_survive_reencode() {
        let raw = r#"[{"productId":"5","quantity":2},{"productId":"12","quantity":1}]"#;
        let cart = Cart::from_cookie(raw);
        let reencoded = urlencoding::decode(&cart.to_cookie()).unwrap().into_owned();
        assert_eq!(reencoded, raw);

        let numeric = Cart::from_cookie(r#"[{"productId":7,"quantity":1}]"#);
        let reencoded = urlencoding::decode(&numeric.to_cookie()).unwrap().into_owned();
        assert_eq!(reencoded, r#"[{"productId":"7","quantity":1}]"#);
    }

    #[test]
    fn test_cookie_duplicate_lines_are_merged() {
        let mut cart = Cart::from_cookie(
            r#"[{"productId":"5","quantity":1},{"productId":9,"quantity":1},{"productId":5,"quantity":1}]"#,
        );
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].product_id, ProductId::new(5));
        assert_eq!(cart.quantity_of(ProductId::new(5)), 2);

        cart.add(ProductId::new(5));
        assert_eq!(cart.quantity_of(ProductId::new(5)), 3);
        assert_eq!(cart.total_items(), 4);
    }
}
