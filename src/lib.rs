pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod ports;
pub mod services;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::ports::{CatalogStore, OrderStore};
use crate::services::{CatalogService, OrderService};

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
    pub catalog: CatalogService,
}

impl AppState {
    /// Wires both services to one backing store.
    pub fn from_store<S>(store: S) -> Self
    where
        S: OrderStore + CatalogStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            orders: OrderService::new(store.clone()),
            catalog: CatalogService::new(store),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/orders",
            post(handlers::orders::place_order).get(handlers::orders::list_orders),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route("/products", get(handlers::products::list_products))
        .route("/products/:id", get(handlers::products::get_product))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(axum::middleware::from_fn(
            middleware::request_logger_middleware,
        ))
        .with_state(state)
}
