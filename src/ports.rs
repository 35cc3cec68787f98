//! Persistence ports used by the order core.
//! Adapters live in `crate::adapters`.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Account, NewOrder, Order, OrderDetail, OrderSummary, Product};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() || db.is_check_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A unit of work holding row locks until it is committed or rolled back.
///
/// Locks taken by `lock_product` and `lock_account` are exclusive: another
/// transaction asking for the same row waits until this one resolves and then
/// observes the committed state. Dropping a transaction without committing
/// discards every change made through it.
#[async_trait]
pub trait OrderTransaction: Send {
    /// Locks the product row and returns its current state, or `None` if absent.
    async fn lock_product(&mut self, product_id: Uuid) -> StoreResult<Option<Product>>;

    /// Locks the account row and returns its current state, or `None` if absent.
    async fn lock_account(&mut self, buyer_id: i64) -> StoreResult<Option<Account>>;

    /// Inserts the order and all of its lines.
    async fn insert_order(&mut self, order: &NewOrder) -> StoreResult<Order>;

    async fn decrement_stock(&mut self, product_id: Uuid, quantity: i64) -> StoreResult<()>;

    async fn debit_balance(&mut self, buyer_id: i64, amount: &BigDecimal) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>>;

    /// Orders owned by `buyer_id`, most recent first.
    async fn list_orders(&self, buyer_id: i64) -> StoreResult<Vec<OrderSummary>>;

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderDetail>>;

    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn find_product(&self, product_id: Uuid) -> StoreResult<Option<Product>>;
}
