//! RocketShoes cart library.
//!
//! A shopping-cart state container for a storefront client. The cart lives in
//! memory, is mirrored into a key-value store after every successful mutation,
//! and every quantity is validated against a remote catalog/stock API.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart and exposes add/remove/update-amount
//! - [`catalog::Catalog`] looks up product metadata and stock (HTTP via `reqwest`)
//! - [`storage::KeyValueStore`] holds the persisted JSON blob
//! - [`notify::Notifier`] receives user-visible error notifications
//!
//! Operation failures never reach the caller; they are logged and turned into
//! notifications, so callers observe outcomes through the resulting cart.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, CartStore, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let store = CartStore::from_config(&config, Arc::new(TracingNotifier)).await?;
//!
//! store.add_product(ProductId::new(5)).await;
//! let view = store.view(config.currency).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod storage;
pub mod store;
pub mod telemetry;
pub mod view;

pub use catalog::{Catalog, CatalogError, HttpCatalog};
pub use config::{CartConfig, CatalogConfig, ConfigError};
pub use error::{CartError, ErrorKind, OperationFailure};
pub use models::{CartItem, Product, Stock, UpdateProductAmount};
pub use notify::{ChannelNotifier, Notification, Notifier, TracingNotifier};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, DEFAULT_CART_KEY, SetupError};
pub use telemetry::{LogFormat, init_tracing};
pub use view::{CartItemView, CartView};
