//! Postgres implementation of the order and catalog ports.
//!
//! Row locks are `SELECT ... FOR UPDATE` inside one database transaction, so
//! they are released by Postgres itself on commit or rollback, including when
//! the connection goes away.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::queries;
use crate::domain::{Account, NewOrder, Order, OrderDetail, OrderLine, OrderSummary, Product};
use crate::ports::{CatalogStore, OrderStore, OrderTransaction, StoreError, StoreResult};

/// Postgres-backed store.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
    lock_timeout_ms: Option<u64>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout_ms: None,
        }
    }

    /// Bounds how long a placement waits on another transaction's row locks.
    pub fn with_lock_timeout(mut self, lock_timeout_ms: u64) -> Self {
        self.lock_timeout_ms = Some(lock_timeout_ms).filter(|ms| *ms > 0);
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>> {
        let mut tx = self.pool.begin().await?;
        if let Some(timeout_ms) = self.lock_timeout_ms {
            queries::set_lock_timeout(&mut tx, timeout_ms).await?;
        }
        Ok(Box::new(PostgresOrderTransaction { tx }))
    }

    async fn list_orders(&self, buyer_id: i64) -> StoreResult<Vec<OrderSummary>> {
        let rows = queries::list_orders_for_buyer(&self.pool, buyer_id).await?;
        Ok(rows.into_iter().map(|r| r.into_summary()).collect())
    }

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderDetail>> {
        let Some(order) = queries::find_order_by_code(&self.pool, order_id).await? else {
            return Ok(None);
        };

        let lines = queries::get_order_lines(&self.pool, order.id).await?;

        Ok(Some(OrderDetail {
            id: order.code,
            buyer_id: order.buyer_id,
            total_price: order.total_price,
            created_at: order.created_at,
            lines: lines.into_iter().map(|l| l.into_detail()).collect(),
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresOrderStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let rows = queries::list_products(&self.pool).await?;
        Ok(rows.into_iter().map(|r| r.into_domain()).collect())
    }

    async fn find_product(&self, product_id: Uuid) -> StoreResult<Option<Product>> {
        let row = queries::find_product(&self.pool, product_id).await?;
        Ok(row.map(|r| r.into_domain()))
    }
}

/// One placement transaction. Dropping it without `commit` rolls back.
pub struct PostgresOrderTransaction {
    tx: SqlxTransaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PostgresOrderTransaction {
    async fn lock_product(&mut self, product_id: Uuid) -> StoreResult<Option<Product>> {
        let row = queries::lock_product(&mut self.tx, product_id).await?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn lock_account(&mut self, buyer_id: i64) -> StoreResult<Option<Account>> {
        let row = queries::lock_account(&mut self.tx, buyer_id).await?;
        Ok(row.map(|r| r.into_domain()))
    }

    async fn insert_order(&mut self, order: &NewOrder) -> StoreResult<Order> {
        let row =
            queries::insert_order(&mut self.tx, &order.code, order.buyer_id, &order.total_price)
                .await?;

        let mut lines = Vec::with_capacity(order.lines.len());
        for (position, line) in order.lines.iter().enumerate() {
            let inserted = queries::insert_order_line(
                &mut self.tx,
                row.id,
                position as i32,
                line.product_id,
                line.quantity,
                &line.unit_price,
            )
            .await?;

            if inserted != 1 {
                return Err(StoreError::NotFound(format!(
                    "product {} vanished while inserting order {}",
                    line.product_id, order.code
                )));
            }

            lines.push(OrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price.clone(),
            });
        }

        Ok(Order {
            id: row.code,
            buyer_id: row.buyer_id,
            total_price: row.total_price,
            created_at: row.created_at,
            lines,
        })
    }

    async fn decrement_stock(&mut self, product_id: Uuid, quantity: i64) -> StoreResult<()> {
        let updated = queries::decrement_stock(&mut self.tx, product_id, quantity).await?;
        if updated != 1 {
            return Err(StoreError::Conflict(format!(
                "stock of product {} cannot be decremented by {}",
                product_id, quantity
            )));
        }
        Ok(())
    }

    async fn debit_balance(&mut self, buyer_id: i64, amount: &BigDecimal) -> StoreResult<()> {
        let updated = queries::debit_balance(&mut self.tx, buyer_id, amount).await?;
        if updated != 1 {
            return Err(StoreError::Conflict(format!(
                "balance of account {} cannot be debited by {}",
                buyer_id, amount
            )));
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
