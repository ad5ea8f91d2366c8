//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! Tests drive a real `CartStore` + `HttpCatalog` against [`FakeCatalogServer`],
//! an in-process `axum` server bound to an ephemeral loopback port that serves
//! `GET /products/{id}` and `GET /stock/{id}` from in-memory tables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, sync::RwLock, task::JoinHandle};

/// Shared tables and counters behind the fake server.
#[derive(Clone, Default)]
struct FakeCatalogState {
    products: Arc<RwLock<HashMap<i32, Value>>>,
    stock: Arc<RwLock<HashMap<i32, Value>>>,
    failure: Arc<RwLock<Option<StatusCode>>>,
    product_hits: Arc<AtomicUsize>,
    stock_hits: Arc<AtomicUsize>,
}

/// In-process catalog/stock API.
///
/// The server task is aborted on drop.
pub struct FakeCatalogServer {
    base_url: String,
    state: FakeCatalogState,
    handle: JoinHandle<()>,
}

impl FakeCatalogServer {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn spawn() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = FakeCatalogState::default();

        let app = Router::new()
            .route("/products/{id}", get(product))
            .route("/stock/{id}", get(stock))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            // Runs until aborted; a serve error just ends the task.
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{addr}/"),
            state,
            handle,
        })
    }

    /// Base URL with a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a product with `in_stock` units.
    pub async fn add_product(&self, id: i32, title: &str, price: f64, in_stock: i64) {
        self.state.products.write().await.insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://cdn.example.com/shoes/{id}.jpg"),
            }),
        );
        self.set_stock(id, in_stock).await;
    }

    /// Replace the stock entry for `id`.
    pub async fn set_stock(&self, id: i32, in_stock: i64) {
        self.set_raw_stock(id, json!({ "id": id, "amount": in_stock }))
            .await;
    }

    /// Replace the stock entry for `id` with arbitrary JSON.
    pub async fn set_raw_stock(&self, id: i32, body: Value) {
        self.state.stock.write().await.insert(id, body);
    }

    /// Make every request fail with `status` (`None` restores normal service).
    pub async fn fail_with(&self, status: Option<StatusCode>) {
        *self.state.failure.write().await = status;
    }

    /// Number of `/products/{id}` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }

    /// Number of `/stock/{id}` requests served.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeCatalogServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn product(State(state): State<FakeCatalogState>, Path(id): Path<i32>) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    lookup(&state, &state.products, id).await
}

async fn stock(State(state): State<FakeCatalogState>, Path(id): Path<i32>) -> Response {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);
    lookup(&state, &state.stock, id).await
}

async fn lookup(
    state: &FakeCatalogState,
    table: &RwLock<HashMap<i32, Value>>,
    id: i32,
) -> Response {
    if let Some(status) = *state.failure.read().await {
        return (status, "catalog unavailable").into_response();
    }

    match table.read().await.get(&id) {
        Some(body) => Json(body.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}
