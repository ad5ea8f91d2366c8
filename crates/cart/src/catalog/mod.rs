//! Catalog and stock lookups.
//!
//! # APIs
//!
//! - `GET /products/{id}` - product metadata (id, title, price, image)
//! - `GET /stock/{id}` - available units (`{ id, amount }`)
//!
//! The catalog is the source of truth for stock. The cart re-fetches stock on
//! every mutating call and never caches it; product metadata may be cached by
//! an implementation.

mod http;

pub use http::HttpCatalog;

use async_trait::async_trait;
use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::models::{Product, Stock};

/// Errors that can occur when interacting with the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Product or stock entry not found.
    #[error("Not found: product {0}")]
    NotFound(ProductId),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Read-only product and stock lookups.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch product metadata.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Fetch the current stock entry.
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError>;
}
