//! Catalog product type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use dimensional_designs_core::ProductId;

/// A catalog item.
///
/// Products are read-only from the API's point of view; the catalog is
/// seeded out of band (see `dd-cli seed products`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price, serialized as a JSON number for the browser client.
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    /// File name under `/images`.
    pub image_filename: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_json_shape() {
        let product = Product {
            product_id: ProductId::new(7),
            name: "Hex Planter".to_string(),
            description: "Self-watering planter".to_string(),
            cost: Decimal::new(2450, 2),
            image_filename: "hex-planter.jpg".to_string(),
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["product_id"], 7);
        assert_eq!(json["cost"], 24.5);
        assert_eq!(json["image_filename"], "hex-planter.jpg");
    }
}
