//! Cart operation errors.
//!
//! Every failure of a cart operation is one of the six [`CartError`]
//! variants. They never propagate out of [`crate::CartStore`]: the store logs
//! them and forwards a [`crate::Notification`] built from [`ErrorKind`] and
//! [`ErrorKind::user_message`] to the configured notifier.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Errors produced by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The catalog reports no units available for a new product.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// Requested amount is not positive or exceeds the available stock.
    #[error("invalid amount {requested} for product {product_id} (in stock: {in_stock})")]
    InvalidAmount {
        product_id: ProductId,
        requested: i64,
        in_stock: i64,
    },

    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    ProductNotFound(ProductId),

    /// Adding a product failed on a lookup or while persisting.
    #[error("failed to add product {product_id}: {source}")]
    AddProductFailed {
        product_id: ProductId,
        source: OperationFailure,
    },

    /// Removing a product failed while persisting.
    #[error("failed to remove product {product_id}: {source}")]
    RemoveProductFailed {
        product_id: ProductId,
        source: OperationFailure,
    },

    /// Updating an amount failed on the stock lookup or while persisting.
    #[error("failed to update amount of product {product_id}: {source}")]
    UpdateAmountFailed {
        product_id: ProductId,
        source: OperationFailure,
    },
}

/// Underlying cause of a `*Failed` cart error.
#[derive(Debug, Error)]
pub enum OperationFailure {
    /// Catalog or stock lookup failed.
    #[error("catalog lookup: {0}")]
    Catalog(#[from] CatalogError),

    /// Writing the cart to storage failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

/// Discriminant of a [`CartError`], carried by notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    OutOfStock,
    InvalidAmount,
    ProductNotFound,
    AddProductFailed,
    RemoveProductFailed,
    UpdateAmountFailed,
}

impl ErrorKind {
    /// Message shown to the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::OutOfStock | Self::InvalidAmount => "Requested quantity is out of stock",
            Self::AddProductFailed => "Error adding product",
            Self::ProductNotFound | Self::RemoveProductFailed => "Error removing product",
            Self::UpdateAmountFailed => "Error changing product quantity",
        }
    }
}

impl CartError {
    /// The error's kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfStock(_) => ErrorKind::OutOfStock,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::ProductNotFound(_) => ErrorKind::ProductNotFound,
            Self::AddProductFailed { .. } => ErrorKind::AddProductFailed,
            Self::RemoveProductFailed { .. } => ErrorKind::RemoveProductFailed,
            Self::UpdateAmountFailed { .. } => ErrorKind::UpdateAmountFailed,
        }
    }

    /// Product the failed operation was about.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::OutOfStock(id) | Self::ProductNotFound(id) => *id,
            Self::InvalidAmount { product_id, .. }
            | Self::AddProductFailed { product_id, .. }
            | Self::RemoveProductFailed { product_id, .. }
            | Self::UpdateAmountFailed { product_id, .. } => *product_id,
        }
    }

    /// Whether the failure came from a collaborator rather than validation.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::AddProductFailed { .. }
                | Self::RemoveProductFailed { .. }
                | Self::UpdateAmountFailed { .. }
        )
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
