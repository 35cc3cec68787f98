//! Order domain entities.
//! Orders are created once, together with their lines, and never updated.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const ORDER_CODE_PREFIX: &str = "OD";
pub const ORDER_CODE_SUFFIX_LEN: usize = 10;

/// Generates a short, shareable order code such as `OD3F9A1C07BE`.
///
/// The suffix is drawn from a v4 uuid; uniqueness is ultimately enforced by
/// the store (a `UNIQUE` column in Postgres).
pub fn generate_order_code() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ORDER_CODE_SUFFIX_LEN)
        .collect();
    format!("{}{}", ORDER_CODE_PREFIX, suffix.to_ascii_uppercase())
}

/// One requested (product, quantity) pair of a basket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BasketItem {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Incoming request to place an order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct PlaceOrderRequest {
    pub buyer_id: i64,
    pub products: Vec<BasketItem>,
}

/// A line ready to be written: price captured while the product row was locked.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: BigDecimal,
}

/// An order ready to be written inside the placement transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub code: String,
    pub buyer_id: i64,
    pub total_price: BigDecimal,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i64,
    #[schema(value_type = String, example = "100.00")]
    pub unit_price: BigDecimal,
}

impl OrderLine {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// A persisted order, as returned by a successful placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: String,
    pub buyer_id: i64,
    #[schema(value_type = String, example = "300.00")]
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: String,
    #[schema(value_type = String, example = "300.00")]
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLineDetail {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i64,
    #[schema(value_type = String, example = "100.00")]
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub id: String,
    pub buyer_id: i64,
    #[schema(value_type = String, example = "300.00")]
    pub total_price: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<OrderLineDetail>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            total_price: order.total_price.clone(),
            created_at: order.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn order_code_has_prefix_and_fixed_length() {
        let code = generate_order_code();
        assert!(code.starts_with(ORDER_CODE_PREFIX));
        assert_eq!(code.len(), ORDER_CODE_PREFIX.len() + ORDER_CODE_SUFFIX_LEN);
        assert!(code
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit()));
    }

    #[test]
    fn order_codes_do_not_repeat() {
        let codes: HashSet<String> = (0..10_000).map(|_| generate_order_code()).collect();
        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn line_subtotal_multiplies_price_by_quantity() {
        let line = OrderLine {
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: "19.99".parse().unwrap(),
        };
        assert_eq!(line.subtotal(), "59.97".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn place_order_request_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<PlaceOrderRequest>(
            r#"{"buyer_id":1,"products":[],"wallet":"card"}"#,
        );
        assert!(parsed.is_err());
    }
}
