//! In-process implementation of the order and catalog ports.
//!
//! Every product and account row sits behind its own async mutex. A
//! transaction keeps the owned guards of the rows it locked until it commits
//! or is dropped, which gives the same blocking behaviour as row locks in
//! Postgres. Writes go straight to the guarded rows; the snapshot taken at
//! lock time is written back if the transaction ends without committing.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use crate::domain::{
    Account, NewOrder, Order, OrderDetail, OrderLine, OrderLineDetail, OrderSummary, Product,
};
use crate::ports::{CatalogStore, OrderStore, OrderTransaction, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    products: RwLock<HashMap<Uuid, Arc<Mutex<Product>>>>,
    accounts: RwLock<HashMap<i64, Arc<Mutex<Account>>>>,
    orders: Mutex<Vec<Order>>,
}

#[derive(Clone, Default)]
pub struct MemoryOrderStore {
    tables: Arc<Tables>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.tables
            .products
            .write()
            .await
            .insert(product.id, Arc::new(Mutex::new(product)));
    }

    pub async fn insert_account(&self, account: Account) {
        self.tables
            .accounts
            .write()
            .await
            .insert(account.id, Arc::new(Mutex::new(account)));
    }

    /// Committed state of a product; waits while a transaction holds the row.
    pub async fn product(&self, product_id: Uuid) -> Option<Product> {
        let cell = self.tables.products.read().await.get(&product_id).cloned()?;
        let row = cell.lock().await;
        Some(row.clone())
    }

    /// Committed state of an account; waits while a transaction holds the row.
    pub async fn account(&self, buyer_id: i64) -> Option<Account> {
        let cell = self.tables.accounts.read().await.get(&buyer_id).cloned()?;
        let row = cell.lock().await;
        Some(row.clone())
    }

    pub async fn order_count(&self) -> usize {
        self.tables.orders.lock().await.len()
    }

    async fn product_name(&self, product_id: Uuid) -> String {
        self.product(product_id)
            .await
            .map(|p| p.name)
            .unwrap_or_default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn begin(&self) -> StoreResult<Box<dyn OrderTransaction>> {
        Ok(Box::new(MemoryOrderTransaction {
            tables: self.tables.clone(),
            products: HashMap::new(),
            accounts: HashMap::new(),
            pending: Vec::new(),
            committed: false,
        }))
    }

    async fn list_orders(&self, buyer_id: i64) -> StoreResult<Vec<OrderSummary>> {
        let orders = self.tables.orders.lock().await;
        Ok(orders
            .iter()
            .rev()
            .filter(|o| o.buyer_id == buyer_id)
            .map(OrderSummary::from)
            .collect())
    }

    async fn find_order(&self, order_id: &str) -> StoreResult<Option<OrderDetail>> {
        let order = {
            let orders = self.tables.orders.lock().await;
            orders.iter().find(|o| o.id == order_id).cloned()
        };
        let Some(order) = order else {
            return Ok(None);
        };

        let mut lines = Vec::with_capacity(order.lines.len());
        for line in order.lines {
            lines.push(OrderLineDetail {
                product_id: line.product_id,
                product_name: self.product_name(line.product_id).await,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }

        Ok(Some(OrderDetail {
            id: order.id,
            buyer_id: order.buyer_id,
            total_price: order.total_price,
            created_at: order.created_at,
            lines,
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryOrderStore {
    async fn list_products(&self) -> StoreResult<Vec<Product>> {
        let cells: Vec<Arc<Mutex<Product>>> =
            self.tables.products.read().await.values().cloned().collect();

        let mut products = Vec::with_capacity(cells.len());
        for cell in cells {
            products.push(cell.lock().await.clone());
        }
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn find_product(&self, product_id: Uuid) -> StoreResult<Option<Product>> {
        Ok(self.product(product_id).await)
    }
}

struct LockedRow<T> {
    guard: OwnedMutexGuard<T>,
    snapshot: T,
}

impl<T: Clone> LockedRow<T> {
    fn new(guard: OwnedMutexGuard<T>) -> Self {
        let snapshot = T::clone(&guard);
        Self { guard, snapshot }
    }

    fn restore(&mut self) {
        *self.guard = self.snapshot.clone();
    }
}

pub struct MemoryOrderTransaction {
    tables: Arc<Tables>,
    products: HashMap<Uuid, LockedRow<Product>>,
    accounts: HashMap<i64, LockedRow<Account>>,
    pending: Vec<Order>,
    committed: bool,
}

impl MemoryOrderTransaction {
    async fn locked_product(&mut self, product_id: Uuid) -> StoreResult<&mut LockedRow<Product>> {
        if !self.products.contains_key(&product_id) {
            let cell = self.tables.products.read().await.get(&product_id).cloned();
            let cell = cell.ok_or_else(|| StoreError::NotFound(format!("product {}", product_id)))?;
            let row = LockedRow::new(cell.lock_owned().await);
            self.products.insert(product_id, row);
        }

        self.products
            .get_mut(&product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product_id)))
    }

    async fn locked_account(&mut self, buyer_id: i64) -> StoreResult<&mut LockedRow<Account>> {
        if !self.accounts.contains_key(&buyer_id) {
            let cell = self.tables.accounts.read().await.get(&buyer_id).cloned();
            let cell = cell.ok_or_else(|| StoreError::NotFound(format!("account {}", buyer_id)))?;
            let row = LockedRow::new(cell.lock_owned().await);
            self.accounts.insert(buyer_id, row);
        }

        self.accounts
            .get_mut(&buyer_id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", buyer_id)))
    }
}

#[async_trait]
impl OrderTransaction for MemoryOrderTransaction {
    async fn lock_product(&mut self, product_id: Uuid) -> StoreResult<Option<Product>> {
        match self.locked_product(product_id).await {
            Ok(row) => Ok(Some(Product::clone(&row.guard))),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn lock_account(&mut self, buyer_id: i64) -> StoreResult<Option<Account>> {
        match self.locked_account(buyer_id).await {
            Ok(row) => Ok(Some(Account::clone(&row.guard))),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn insert_order(&mut self, order: &NewOrder) -> StoreResult<Order> {
        let duplicate = self.pending.iter().any(|o| o.id == order.code)
            || self.tables.orders.lock().await.iter().any(|o| o.id == order.code);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "order code {} already exists",
                order.code
            )));
        }

        let products = self.tables.products.read().await;
        if let Some(missing) = order.lines.iter().find(|l| !products.contains_key(&l.product_id)) {
            return Err(StoreError::NotFound(format!("product {}", missing.product_id)));
        }
        drop(products);

        let inserted = Order {
            id: order.code.clone(),
            buyer_id: order.buyer_id,
            total_price: order.total_price.clone(),
            created_at: Utc::now(),
            lines: order
                .lines
                .iter()
                .map(|l| OrderLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price.clone(),
                })
                .collect(),
        };
        self.pending.push(inserted.clone());
        Ok(inserted)
    }

    async fn decrement_stock(&mut self, product_id: Uuid, quantity: i64) -> StoreResult<()> {
        let row = self.locked_product(product_id).await?;
        if row.guard.stock < quantity {
            return Err(StoreError::Conflict(format!(
                "stock of product {} cannot be decremented by {}",
                product_id, quantity
            )));
        }
        row.guard.stock -= quantity;
        Ok(())
    }

    async fn debit_balance(&mut self, buyer_id: i64, amount: &BigDecimal) -> StoreResult<()> {
        let row = self.locked_account(buyer_id).await?;
        if &row.guard.balance < amount {
            return Err(StoreError::Conflict(format!(
                "balance of account {} cannot be debited by {}",
                buyer_id, amount
            )));
        }
        row.guard.balance = &row.guard.balance - amount;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut this = self;
        let tables = this.tables.clone();
        let mut orders = tables.orders.lock().await;
        if let Some(clash) = this
            .pending
            .iter()
            .find(|p| orders.iter().any(|o| o.id == p.id))
        {
            return Err(StoreError::Conflict(format!(
                "order code {} already exists",
                clash.id
            )));
        }

        orders.append(&mut this.pending);
        this.committed = true;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        // Drop restores the snapshots and releases the row locks.
        Ok(())
    }
}

impl Drop for MemoryOrderTransaction {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for row in self.products.values_mut() {
            row.restore();
        }
        for row in self.accounts.values_mut() {
            row.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn store_with_product(stock: i64) -> (MemoryOrderStore, Uuid) {
        let store = MemoryOrderStore::new();
        let product = Product::new("Keyboard", BigDecimal::from(100), stock);
        let id = product.id;
        store.insert_product(product).await;
        (store, id)
    }

    #[tokio::test]
    async fn locked_row_blocks_other_transactions_until_commit() {
        let (store, id) = store_with_product(5).await;

        let mut first = store.begin().await.unwrap();
        first.lock_product(id).await.unwrap();
        first.decrement_stock(id, 2).await.unwrap();

        let contender = store.clone();
        let waiter = tokio::spawn(async move {
            let mut second = contender.begin().await.unwrap();
            second.lock_product(id).await.unwrap()
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        first.commit().await.unwrap();
        let seen = waiter.await.unwrap().expect("product exists");
        assert_eq!(seen.stock, 3);
    }

    #[tokio::test]
    async fn rollback_restores_locked_rows() {
        let (store, id) = store_with_product(5).await;
        store
            .insert_account(Account::new(1, "Ada", "ada@example.com", BigDecimal::from(50)))
            .await;

        let mut tx = store.begin().await.unwrap();
        tx.decrement_stock(id, 4).await.unwrap();
        tx.debit_balance(1, &BigDecimal::from(20)).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.product(id).await.unwrap().stock, 5);
        assert_eq!(store.account(1).await.unwrap().balance, BigDecimal::from(50));
    }

    #[tokio::test]
    async fn dropped_transaction_discards_changes() {
        let (store, id) = store_with_product(5).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.decrement_stock(id, 5).await.unwrap();
        }

        assert_eq!(store.product(id).await.unwrap().stock, 5);
    }

    #[tokio::test]
    async fn stock_never_goes_negative() {
        let (store, id) = store_with_product(1).await;

        let mut tx = store.begin().await.unwrap();
        let result = tx.decrement_stock(id, 2).await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn relocking_a_held_row_does_not_wait() {
        let (store, id) = store_with_product(5).await;

        let mut tx = store.begin().await.unwrap();
        tx.lock_product(id).await.unwrap();
        let again = tokio::time::timeout(Duration::from_millis(100), tx.lock_product(id)).await;

        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn pending_orders_are_invisible_until_commit() {
        let (store, id) = store_with_product(5).await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&NewOrder {
            code: "ODTEST000001".to_string(),
            buyer_id: 1,
            total_price: BigDecimal::from(100),
            lines: vec![crate::domain::NewOrderLine {
                product_id: id,
                quantity: 1,
                unit_price: BigDecimal::from(100),
            }],
        })
        .await
        .unwrap();

        assert_eq!(store.order_count().await, 0);
        tx.commit().await.unwrap();
        assert_eq!(store.order_count().await, 1);
    }
}
