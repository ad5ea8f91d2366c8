//! Domain types for the cart and the catalog API.
//!
//! Field names match the catalog's JSON and the persisted cart blob, so these
//! types are (de)serialized directly with no intermediate wire structs.

use rocketshoes_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog Types
// =============================================================================

/// Product metadata returned by `GET /products/{id}`.
///
/// Additional fields sent by the catalog are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// Stock entry returned by `GET /stock/{id}`.
///
/// Authoritative upper bound for the amount of a product in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Catalog product ID.
    pub id: ProductId,
    /// Units available for purchase.
    pub amount: i64,
}

// =============================================================================
// Cart Types
// =============================================================================

/// A line in the cart.
///
/// `amount` is the desired purchase quantity and is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image: String,
    pub amount: u32,
}

impl CartItem {
    /// Create a cart line from catalog metadata.
    #[must_use]
    pub fn from_product(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Unit price times amount.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// Input for [`crate::CartStore::update_product_amount`].
///
/// `amount` is signed so that zero and negative requests reach validation
/// and are rejected there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_product_ignores_unknown_fields() {
        let json = r#"{
            "id": 1,
            "title": "Running shoe",
            "price": "179.90",
            "image": "https://cdn.example.com/1.jpg",
            "brand": "ignored"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Price::new(Decimal::new(17990, 2)));
    }

    #[test]
    fn test_cart_item_from_product() {
        let product = Product {
            id: ProductId::new(2),
            title: "Trail shoe".to_string(),
            price: Price::new(Decimal::new(13990, 2)),
            image: "https://cdn.example.com/2.jpg".to_string(),
        };
        let item = CartItem::from_product(product, 3);
        assert_eq!(item.amount, 3);
        assert_eq!(item.line_total().amount(), Decimal::new(41970, 2));
    }

    #[test]
    fn test_cart_item_json_shape() {
        let item = CartItem {
            id: ProductId::new(3),
            title: "Sneaker".to_string(),
            price: Price::new(Decimal::new(9990, 2)),
            image: "img.jpg".to_string(),
            amount: 1,
        };
        let value = serde_json::to_value(&item).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 5);
        for key in ["id", "title", "price", "image", "amount"] {
            assert!(keys.contains(&key), "missing {key}");
        }
    }

    #[test]
    fn test_update_product_amount_uses_camel_case() {
        let input: UpdateProductAmount =
            serde_json::from_str(r#"{"productId": 5, "amount": 2}"#).unwrap();
        assert_eq!(input.product_id, ProductId::new(5));
        assert_eq!(input.amount, 2);
    }
}
