//! The cart state container.
//!
//! [`CartStore`] owns the cart and is the only way to change it. Each of the
//! three operations validates against the catalog, writes the full cart to
//! storage, and only then swaps the in-memory cart, so a failed operation
//! leaves both copies as they were.
//!
//! Operations never return errors. Failures are logged and sent to the
//! [`Notifier`]; callers observe outcomes through [`CartStore::cart`].

use std::collections::HashSet;
use std::sync::Arc;

use rocketshoes_core::{CurrencyCode, ProductId};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{instrument, warn};

use crate::catalog::{Catalog, CatalogError, HttpCatalog};
use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::models::{CartItem, UpdateProductAmount};
use crate::notify::{Notification, Notifier};
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
use crate::view::CartView;

/// Storage key of the persisted cart unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Error building a store from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
}

/// Shopping cart backed by a catalog and a key-value store.
///
/// Cheaply cloneable via `Arc`; clones operate on the same cart. Mutating
/// operations are serialized, reads return snapshots and never wait on the
/// catalog.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    cart: RwLock<Vec<CartItem>>,
    mutation: Mutex<()>,
    catalog: Arc<dyn Catalog>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    storage_key: String,
}

impl CartStore {
    /// Create a store, hydrating the cart from `storage_key`.
    ///
    /// A missing, unreadable or unparsable blob yields an empty cart.
    pub async fn load(
        catalog: Arc<dyn Catalog>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let cart = hydrate(storage.as_ref(), &storage_key).await;
        tracing::debug!(items = cart.len(), key = %storage_key, "Cart hydrated");

        Self {
            inner: Arc::new(CartStoreInner {
                cart: RwLock::new(cart),
                mutation: Mutex::new(()),
                catalog,
                storage,
                notifier,
                storage_key,
            }),
        }
    }

    /// Create a store from configuration: an [`HttpCatalog`] plus a
    /// [`JsonFileStore`] when a storage path is set, else a [`MemoryStore`].
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if the HTTP client cannot be built or the storage
    /// file cannot be opened.
    pub async fn from_config(
        config: &CartConfig,
        notifier: Arc<dyn Notifier>,
    ) -> std::result::Result<Self, SetupError> {
        let catalog = Arc::new(HttpCatalog::new(&config.catalog)?);
        let storage: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => Arc::new(JsonFileStore::open(path).await?),
            None => Arc::new(MemoryStore::new()),
        };

        Ok(Self::load(catalog, storage, notifier, config.storage_key.clone()).await)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the cart in insertion order.
    pub async fn cart(&self) -> Vec<CartItem> {
        self.inner.cart.read().await.clone()
    }

    /// The line for `product_id`, if present.
    pub async fn item(&self, product_id: ProductId) -> Option<CartItem> {
        self.inner
            .cart
            .read()
            .await
            .iter()
            .find(|item| item.id == product_id)
            .cloned()
    }

    /// Number of distinct products.
    pub async fn len(&self) -> usize {
        self.inner.cart.read().await.len()
    }

    /// Whether the cart is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.cart.read().await.is_empty()
    }

    /// Display data for the current cart.
    pub async fn view(&self, currency: CurrencyCode) -> CartView {
        CartView::new(&self.inner.cart.read().await, currency)
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through
    /// [`update_product_amount`](Self::update_product_amount) with its amount
    /// plus one. A new product is added with amount 1 if the catalog reports
    /// at least one unit in stock.
    #[instrument(skip(self))]
    pub async fn add_product(&self, product_id: ProductId) {
        let _guard = self.inner.mutation.lock().await;
        let result = self.try_add_product(product_id).await;
        self.report(result);
    }

    /// Remove a product from the cart.
    #[instrument(skip(self))]
    pub async fn remove_product(&self, product_id: ProductId) {
        let _guard = self.inner.mutation.lock().await;
        let result = self.try_remove_product(product_id).await;
        self.report(result);
    }

    /// Set the amount of a product.
    ///
    /// The amount must be positive and no greater than the current stock.
    /// An id that is not in the cart leaves the cart as it is, but the cart
    /// is still persisted.
    #[instrument(skip(self))]
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        let _guard = self.inner.mutation.lock().await;
        let result = self
            .try_update_product_amount(request.product_id, request.amount)
            .await;
        self.report(result);
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<()> {
        if let Some(existing) = self.item(product_id).await {
            return self
                .try_update_product_amount(product_id, i64::from(existing.amount) + 1)
                .await;
        }

        let add_failed = |source: CatalogError| CartError::AddProductFailed {
            product_id,
            source: source.into(),
        };

        let (product, stock) = tokio::try_join!(
            self.inner.catalog.product(product_id),
            self.inner.catalog.stock(product_id),
        )
        .map_err(add_failed)?;

        if product.id != product_id {
            return Err(add_failed(CatalogError::Parse(format!(
                "requested product {product_id}, catalog returned {}",
                product.id
            ))));
        }

        if stock.amount < 1 {
            return Err(CartError::OutOfStock(product_id));
        }

        let mut next = self.cart().await;
        next.push(CartItem::from_product(product, 1));

        self.commit(next)
            .await
            .map_err(|source| CartError::AddProductFailed {
                product_id,
                source: source.into(),
            })
    }

    async fn try_remove_product(&self, product_id: ProductId) -> Result<()> {
        let cart = self.cart().await;
        if !cart.iter().any(|item| item.id == product_id) {
            return Err(CartError::ProductNotFound(product_id));
        }

        let next = cart
            .into_iter()
            .filter(|item| item.id != product_id)
            .collect();

        self.commit(next)
            .await
            .map_err(|source| CartError::RemoveProductFailed {
                product_id,
                source: source.into(),
            })
    }

    async fn try_update_product_amount(&self, product_id: ProductId, amount: i64) -> Result<()> {
        let stock = self
            .inner
            .catalog
            .stock(product_id)
            .await
            .map_err(|source| CartError::UpdateAmountFailed {
                product_id,
                source: source.into(),
            })?;

        let invalid = || CartError::InvalidAmount {
            product_id,
            requested: amount,
            in_stock: stock.amount,
        };
        if amount <= 0 || amount > stock.amount {
            return Err(invalid());
        }
        let amount = u32::try_from(amount).map_err(|_| invalid())?;

        let mut next = self.cart().await;
        match next.iter_mut().find(|item| item.id == product_id) {
            Some(item) => item.amount = amount,
            None => warn!("Amount update for a product that is not in the cart"),
        }

        self.commit(next)
            .await
            .map_err(|source| CartError::UpdateAmountFailed {
                product_id,
                source: source.into(),
            })
    }

    /// Persist `next`, then make it the current cart.
    async fn commit(&self, next: Vec<CartItem>) -> std::result::Result<(), StorageError> {
        let blob = serde_json::to_string(&next)?;
        self.inner
            .storage
            .set(&self.inner.storage_key, blob)
            .await?;
        *self.inner.cart.write().await = next;
        Ok(())
    }

    /// Log a failed operation and notify the shopper.
    fn report(&self, result: Result<()>) {
        let Err(err) = result else {
            return;
        };

        let product_id = err.product_id().as_i32();
        if err.is_failure() {
            tracing::error!(error = %err, kind = ?err.kind(), product_id, "Cart operation failed");
        } else {
            tracing::warn!(error = %err, kind = ?err.kind(), product_id, "Cart operation rejected");
        }

        self.inner.notifier.notify(Notification::from(&err));
    }
}

/// Read the persisted cart, falling back to an empty one.
async fn hydrate(storage: &dyn KeyValueStore, key: &str) -> Vec<CartItem> {
    let blob = match storage.get(key).await {
        Ok(Some(blob)) => blob,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, key, "Failed to read persisted cart, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<CartItem>>(&blob) {
        Ok(items) => sanitize(items),
        Err(e) => {
            warn!(error = %e, key, "Persisted cart is not valid, starting empty");
            Vec::new()
        }
    }
}

/// Drop lines with a zero amount and repeated ids (first one wins).
fn sanitize(items: Vec<CartItem>) -> Vec<CartItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            if item.amount == 0 {
                warn!(product_id = %item.id, "Dropping persisted cart line with zero amount");
                return false;
            }
            if !seen.insert(item.id) {
                warn!(product_id = %item.id, "Dropping duplicate persisted cart line");
                return false;
            }
            true
        })
        .collect()
}
