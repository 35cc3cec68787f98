use bigdecimal::BigDecimal;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    generate_order_code, BasketItem, NewOrder, NewOrderLine, Order, OrderDetail, OrderSummary,
    PlaceOrderRequest, Product,
};
use crate::error::AppError;
use crate::ports::{OrderStore, OrderTransaction, StoreError};
use crate::validation;

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Places an order as one all-or-nothing transaction.
    ///
    /// Product rows are locked in uuid order and the buyer's account after
    /// them, so two placements can never wait on each other in a cycle. The
    /// locks are held from the sufficiency checks through the writes until
    /// commit or rollback.
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<Order, AppError> {
        let basket = validation::validate_place_order(&request)?;
        let buyer_id = request.buyer_id;

        let mut tx = self.store.begin().await.map_err(processing_failed)?;

        match reserve_and_write(tx.as_mut(), buyer_id, &basket).await {
            Ok(order) => {
                tx.commit().await.map_err(processing_failed)?;
                tracing::info!(
                    order_id = %order.id,
                    buyer_id,
                    total_price = %order.total_price,
                    lines = order.lines.len(),
                    "Order placed"
                );
                Ok(order)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(buyer_id, error = %rollback_err, "Order rollback failed");
                }
                tracing::warn!(buyer_id, kind = e.kind(), error = %e, "Order rejected");
                Err(e)
            }
        }
    }

    pub async fn list_orders(&self, buyer_id: i64) -> Result<Vec<OrderSummary>, AppError> {
        Ok(self.store.list_orders(buyer_id).await?)
    }

    /// Returns the order only to its owner. Absent and foreign orders produce
    /// the same error.
    pub async fn get_order(&self, buyer_id: i64, order_id: &str) -> Result<OrderDetail, AppError> {
        match self.store.find_order(order_id).await? {
            Some(order) if order.buyer_id == buyer_id => Ok(order),
            _ => Err(AppError::NotFoundOrForbidden(format!(
                "Order {} not found",
                order_id
            ))),
        }
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        Ok(self.store.ping().await?)
    }
}

fn processing_failed(err: StoreError) -> AppError {
    AppError::OrderProcessingFailed(err.to_string())
}

struct PricedLine {
    product: Product,
    quantity: i64,
}

async fn reserve_and_write(
    tx: &mut dyn OrderTransaction,
    buyer_id: i64,
    basket: &[BasketItem],
) -> Result<Order, AppError> {
    // Lock phase: products in canonical order, then the account.
    let mut lock_order: Vec<Uuid> = basket.iter().map(|item| item.product_id).collect();
    lock_order.sort();

    let mut locked: HashMap<Uuid, Product> = HashMap::with_capacity(lock_order.len());
    for product_id in lock_order {
        if let Some(product) = tx.lock_product(product_id).await.map_err(processing_failed)? {
            locked.insert(product_id, product);
        }
    }

    // Checks run in basket order so the reported failure is deterministic.
    let mut total_price = BigDecimal::from(0);
    let mut priced = Vec::with_capacity(basket.len());
    for item in basket {
        let product = locked
            .remove(&item.product_id)
            .ok_or(AppError::ProductNotFound {
                product_id: item.product_id,
            })?;

        if !product.has_stock_for(item.quantity) {
            return Err(AppError::InsufficientStock {
                product_id: product.id,
                requested: item.quantity,
                available: product.stock,
            });
        }

        total_price += &product.price * BigDecimal::from(item.quantity);
        priced.push(PricedLine {
            product,
            quantity: item.quantity,
        });
    }

    let account = tx
        .lock_account(buyer_id)
        .await
        .map_err(processing_failed)?
        .ok_or(AppError::AccountNotFound { buyer_id })?;

    if !account.can_afford(&total_price) {
        return Err(AppError::InsufficientFunds {
            required: total_price,
            available: account.balance,
        });
    }

    // Write phase.
    let new_order = NewOrder {
        code: generate_order_code(),
        buyer_id,
        total_price: total_price.clone(),
        lines: priced
            .iter()
            .map(|line| NewOrderLine {
                product_id: line.product.id,
                quantity: line.quantity,
                unit_price: line.product.price.clone(),
            })
            .collect(),
    };

    let order = tx.insert_order(&new_order).await.map_err(processing_failed)?;

    for line in &priced {
        tx.decrement_stock(line.product.id, line.quantity)
            .await
            .map_err(processing_failed)?;
    }

    tx.debit_balance(buyer_id, &total_price)
        .await
        .map_err(processing_failed)?;

    Ok(order)
}
