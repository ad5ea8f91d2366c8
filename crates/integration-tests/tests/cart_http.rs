//! End-to-end cart tests over HTTP.
//!
//! Each test starts its own fake catalog server on an ephemeral port and a
//! `JsonFileStore` in a temporary directory.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use axum::http::StatusCode;
use rocketshoes_cart::{
    CartConfig, CartItem, CartStore, CatalogConfig, ChannelNotifier, DEFAULT_CART_KEY, ErrorKind,
    HttpCatalog, JsonFileStore, KeyValueStore, Notification, UpdateProductAmount,
};
use rocketshoes_core::{CurrencyCode, ProductId};
use rocketshoes_integration_tests::FakeCatalogServer;
use serde_json::json;
use tokio::sync::mpsc::UnboundedReceiver;

struct Session {
    store: CartStore,
    storage: JsonFileStore,
    notifications: UnboundedReceiver<Notification>,
}

impl Session {
    async fn open(server: &FakeCatalogServer, storage_path: &Path) -> Self {
        let catalog = HttpCatalog::new(&CatalogConfig::new(server.base_url()).unwrap()).unwrap();
        let storage = JsonFileStore::open(storage_path).await.unwrap();
        let (notifier, notifications) = ChannelNotifier::channel();

        let store = CartStore::load(
            Arc::new(catalog),
            Arc::new(storage.clone()),
            Arc::new(notifier),
            DEFAULT_CART_KEY,
        )
        .await;

        Self {
            store,
            storage,
            notifications,
        }
    }

    async fn amounts(&self) -> Vec<(i32, u32)> {
        self.store
            .cart()
            .await
            .iter()
            .map(|item| (item.id.as_i32(), item.amount))
            .collect()
    }

    async fn persisted(&self) -> Option<Vec<CartItem>> {
        self.storage
            .get(DEFAULT_CART_KEY)
            .await
            .unwrap()
            .map(|blob| serde_json::from_str(&blob).unwrap())
    }

    fn next_notification(&mut self) -> Option<ErrorKind> {
        self.notifications.try_recv().ok().map(|n| n.kind)
    }
}

fn id(value: i32) -> ProductId {
    ProductId::new(value)
}

#[tokio::test]
async fn test_add_increment_and_reject_over_stock() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(5, "Tênis de Caminhada", 179.9, 3).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(&server, &dir.path().join("storage.json")).await;

    session.store.add_product(id(5)).await;
    assert_eq!(session.amounts().await, vec![(5, 1)]);

    session.store.add_product(id(5)).await;
    assert_eq!(session.amounts().await, vec![(5, 2)]);

    session
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: id(5),
            amount: 4,
        })
        .await;

    assert_eq!(session.next_notification(), Some(ErrorKind::InvalidAmount));
    assert_eq!(session.amounts().await, vec![(5, 2)]);
    assert_eq!(session.persisted().await.unwrap(), session.store.cart().await);

    let item = session.store.item(id(5)).await.unwrap();
    assert_eq!(item.title, "Tênis de Caminhada");
    assert_eq!(
        session.store.view(CurrencyCode::USD).await.subtotal,
        "$359.80"
    );
}

#[tokio::test]
async fn test_cart_survives_reopen() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(1, "Runner", 139.9, 10).await;
    server.add_product(2, "Trail", 219.9, 10).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let first = Session::open(&server, &path).await;
    first.store.add_product(id(2)).await;
    first.store.add_product(id(1)).await;
    first
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: id(2),
            amount: 3,
        })
        .await;
    let expected = first.store.cart().await;
    drop(first);

    let second = Session::open(&server, &path).await;
    assert_eq!(second.store.cart().await, expected);
    assert_eq!(second.amounts().await, vec![(2, 3), (1, 1)]);
}

#[tokio::test]
async fn test_out_of_stock_product_is_not_added() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(7, "Sold out", 99.9, 0).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(&server, &dir.path().join("storage.json")).await;

    session.store.add_product(id(7)).await;

    assert!(session.store.is_empty().await);
    assert!(session.persisted().await.is_none());
    assert_eq!(session.next_notification(), Some(ErrorKind::OutOfStock));
}

#[tokio::test]
async fn test_unknown_product_fails_to_add() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(&server, &dir.path().join("storage.json")).await;

    session.store.add_product(id(404)).await;

    assert!(session.store.is_empty().await);
    assert_eq!(session.next_notification(), Some(ErrorKind::AddProductFailed));
}

#[tokio::test]
async fn test_malformed_stock_fails_to_add() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(1, "Runner", 139.9, 10).await;
    server
        .set_raw_stock(1, json!({ "id": 1, "amount": "plenty" }))
        .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(&server, &dir.path().join("storage.json")).await;

    session.store.add_product(id(1)).await;

    assert!(session.store.is_empty().await);
    assert_eq!(session.next_notification(), Some(ErrorKind::AddProductFailed));
}

#[tokio::test]
async fn test_server_error_fails_update() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(1, "Runner", 139.9, 10).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(&server, &dir.path().join("storage.json")).await;
    session.store.add_product(id(1)).await;

    server
        .fail_with(Some(StatusCode::INTERNAL_SERVER_ERROR))
        .await;
    session
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: id(1),
            amount: 2,
        })
        .await;

    assert_eq!(session.amounts().await, vec![(1, 1)]);
    assert_eq!(
        session.next_notification(),
        Some(ErrorKind::UpdateAmountFailed)
    );

    server.fail_with(None).await;
    session
        .store
        .update_product_amount(UpdateProductAmount {
            product_id: id(1),
            amount: 2,
        })
        .await;
    assert_eq!(session.amounts().await, vec![(1, 2)]);
    assert_eq!(session.next_notification(), None);
}

#[tokio::test]
async fn test_remove_product() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(1, "Runner", 139.9, 10).await;
    server.add_product(2, "Trail", 219.9, 10).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::open(&server, &dir.path().join("storage.json")).await;
    session.store.add_product(id(1)).await;
    session.store.add_product(id(2)).await;

    session.store.remove_product(id(1)).await;
    assert_eq!(session.amounts().await, vec![(2, 1)]);
    assert_eq!(session.persisted().await.unwrap().len(), 1);

    session.store.remove_product(id(1)).await;
    assert_eq!(session.next_notification(), Some(ErrorKind::ProductNotFound));
    assert_eq!(session.amounts().await, vec![(2, 1)]);
}

#[tokio::test]
async fn test_product_metadata_cached_but_stock_refetched() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(1, "Runner", 139.9, 10).await;
    let dir = tempfile::tempdir().unwrap();
    let session = Session::open(&server, &dir.path().join("storage.json")).await;

    session.store.add_product(id(1)).await;
    session.store.remove_product(id(1)).await;
    session.store.add_product(id(1)).await;
    session.store.add_product(id(1)).await;

    assert_eq!(session.amounts().await, vec![(1, 2)]);
    assert_eq!(server.product_hits(), 1);
    assert_eq!(server.stock_hits(), 3);
}

#[tokio::test]
async fn test_store_from_config() {
    let server = FakeCatalogServer::spawn().await.unwrap();
    server.add_product(3, "Court", 99.9, 2).await;
    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("storage.json");

    let base_url = server.base_url().to_string();
    let storage = storage_path.to_string_lossy().to_string();
    let config = CartConfig::from_lookup(|key| match key {
        "ROCKETSHOES_API_URL" => Some(base_url.clone()),
        "ROCKETSHOES_STORAGE_PATH" => Some(storage.clone()),
        "ROCKETSHOES_CART_KEY" => Some("test:cart".to_string()),
        _ => None,
    })
    .unwrap();
    let (notifier, _notifications) = ChannelNotifier::channel();

    let store = CartStore::from_config(&config, Arc::new(notifier))
        .await
        .unwrap();
    store.add_product(id(3)).await;

    let reopened = JsonFileStore::open(&storage_path).await.unwrap();
    let blob = reopened.get("test:cart").await.unwrap().unwrap();
    let persisted: Vec<CartItem> = serde_json::from_str(&blob).unwrap();
    assert_eq!(persisted, store.cart().await);
}
