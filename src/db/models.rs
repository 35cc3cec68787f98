//! Row types for SQLx. Internal `BIGSERIAL` keys stay in this module and the
//! adapter; the domain only sees public identifiers.

use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{Account, OrderLineDetail, OrderSummary, Product};

#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub uuid: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i64,
    pub image: Option<String>,
}

impl ProductRow {
    pub fn into_domain(self) -> Product {
        Product {
            id: self.uuid,
            name: self.name,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image: self.image,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub balance: BigDecimal,
}

impl AccountRow {
    pub fn into_domain(self) -> Account {
        Account {
            id: self.id,
            name: self.name,
            email: self.email,
            balance: self.balance,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub code: String,
    pub buyer_id: i64,
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_summary(self) -> OrderSummary {
        OrderSummary {
            id: self.code,
            total_price: self.total_price,
            created_at: self.created_at,
        }
    }
}

/// An order line joined with its product's public id and name.
#[derive(Debug, FromRow)]
pub struct OrderLineRow {
    pub product_uuid: Uuid,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: BigDecimal,
}

impl OrderLineRow {
    pub fn into_detail(self) -> OrderLineDetail {
        OrderLineDetail {
            product_id: self.product_uuid,
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}
