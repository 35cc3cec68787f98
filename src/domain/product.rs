//! Product domain entity.
//! Catalog view of a product as the order core sees it.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A sellable product, identified by its public uuid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "100.00")]
    pub price: BigDecimal,
    pub stock: i64,
    pub image: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>, price: BigDecimal, stock: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            price,
            stock,
            image: None,
        }
    }

    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}
