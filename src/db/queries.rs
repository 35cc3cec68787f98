use sqlx::types::BigDecimal;
use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{AccountRow, OrderLineRow, OrderRow, ProductRow};

// --- Transaction setup ---

pub async fn set_lock_timeout(
    executor: &mut SqlxTransaction<'_, Postgres>,
    timeout_ms: u64,
) -> Result<()> {
    // SET does not accept bind parameters.
    let sql = format!("SET LOCAL lock_timeout = '{}ms'", timeout_ms);
    sqlx::query(&sql).execute(&mut **executor).await?;
    Ok(())
}

// --- Locking reads ---

pub async fn lock_product(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: Uuid,
) -> Result<Option<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        r#"
        SELECT uuid, name, description, price, stock, image
        FROM products
        WHERE uuid = $1
        FOR UPDATE
        "#,
    )
    .bind(product_id)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn lock_account(
    executor: &mut SqlxTransaction<'_, Postgres>,
    buyer_id: i64,
) -> Result<Option<AccountRow>> {
    sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, email, balance FROM accounts WHERE id = $1 FOR UPDATE",
    )
    .bind(buyer_id)
    .fetch_optional(&mut **executor)
    .await
}

// --- Order writes ---

pub async fn insert_order(
    executor: &mut SqlxTransaction<'_, Postgres>,
    code: &str,
    buyer_id: i64,
    total_price: &BigDecimal,
) -> Result<OrderRow> {
    sqlx::query_as::<_, OrderRow>(
        r#"
        INSERT INTO orders (code, buyer_id, total_price)
        VALUES ($1, $2, $3)
        RETURNING id, code, buyer_id, total_price, created_at
        "#,
    )
    .bind(code)
    .bind(buyer_id)
    .bind(total_price)
    .fetch_one(&mut **executor)
    .await
}

/// Returns the number of inserted rows; zero means the product does not exist.
pub async fn insert_order_line(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: i64,
    position: i32,
    product_id: Uuid,
    quantity: i64,
    unit_price: &BigDecimal,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO order_lines (order_id, product_id, position, quantity, unit_price)
        SELECT $1, p.id, $3, $4, $5 FROM products p WHERE p.uuid = $2
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(position)
    .bind(quantity)
    .bind(unit_price)
    .execute(&mut **executor)
    .await?;

    Ok(result.rows_affected())
}

/// Returns the number of updated rows; zero means the stock would go negative.
pub async fn decrement_stock(
    executor: &mut SqlxTransaction<'_, Postgres>,
    product_id: Uuid,
    quantity: i64,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $2 WHERE uuid = $1 AND stock >= $2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut **executor)
    .await?;

    Ok(result.rows_affected())
}

/// Returns the number of updated rows; zero means the balance would go negative.
pub async fn debit_balance(
    executor: &mut SqlxTransaction<'_, Postgres>,
    buyer_id: i64,
    amount: &BigDecimal,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE accounts SET balance = balance - $2 WHERE id = $1 AND balance >= $2",
    )
    .bind(buyer_id)
    .bind(amount)
    .execute(&mut **executor)
    .await?;

    Ok(result.rows_affected())
}

// --- Order reads ---

pub async fn get_order_lines(pool: &PgPool, order_id: i64) -> Result<Vec<OrderLineRow>> {
    sqlx::query_as::<_, OrderLineRow>(
        r#"
        SELECT p.uuid AS product_uuid, p.name AS product_name, l.quantity, l.unit_price
        FROM order_lines l
        JOIN products p ON p.id = l.product_id
        WHERE l.order_id = $1
        ORDER BY l.position
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

pub async fn list_orders_for_buyer(pool: &PgPool, buyer_id: i64) -> Result<Vec<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(
        r#"
        SELECT id, code, buyer_id, total_price, created_at
        FROM orders
        WHERE buyer_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(buyer_id)
    .fetch_all(pool)
    .await
}

pub async fn find_order_by_code(pool: &PgPool, code: &str) -> Result<Option<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(
        "SELECT id, code, buyer_id, total_price, created_at FROM orders WHERE code = $1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await
}

// --- Catalog reads ---

pub async fn list_products(pool: &PgPool) -> Result<Vec<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        "SELECT uuid, name, description, price, stock, image FROM products ORDER BY name, uuid",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_product(pool: &PgPool, product_id: Uuid) -> Result<Option<ProductRow>> {
    sqlx::query_as::<_, ProductRow>(
        "SELECT uuid, name, description, price, stock, image FROM products WHERE uuid = $1",
    )
    .bind(product_id)
    .fetch_optional(pool)
    .await
}
