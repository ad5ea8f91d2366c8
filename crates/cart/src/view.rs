//! Display data for rendering the cart.

use rocketshoes_core::{CurrencyCode, Price, ProductId};

use crate::models::CartItem;

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub amount: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    /// Sum of all amounts.
    pub item_count: u32,
    /// Number of distinct products (shown on the header badge).
    pub product_count: usize,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty(currency: CurrencyCode) -> Self {
        Self::new(&[], currency)
    }

    /// Build a view of `items`, formatting prices in `currency`.
    #[must_use]
    pub fn new(items: &[CartItem], currency: CurrencyCode) -> Self {
        let subtotal: Price = items.iter().map(CartItem::line_total).sum();

        Self {
            items: items
                .iter()
                .map(|item| CartItemView {
                    id: item.id,
                    title: item.title.clone(),
                    image: item.image.clone(),
                    amount: item.amount,
                    price: item.price.display(currency),
                    line_price: item.line_total().display(currency),
                })
                .collect(),
            subtotal: subtotal.display(currency),
            item_count: items
                .iter()
                .fold(0u32, |acc, item| acc.saturating_add(item.amount)),
            product_count: items.len(),
        }
    }
}
