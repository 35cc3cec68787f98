use serde::de::DeserializeOwned;
use std::fmt;

use crate::domain::{BasketItem, PlaceOrderRequest};

pub const MAX_BASKET_ITEMS: usize = 100;
pub const MIN_LINE_QUANTITY: i64 = 1;
pub const MAX_LINE_QUANTITY: i64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

/// Deserializes a request body, reporting malformed JSON and unknown fields
/// as validation failures instead of extractor rejections.
pub fn parse_strict<T: DeserializeOwned>(body: &[u8]) -> Result<T, ValidationError> {
    serde_json::from_slice(body).map_err(|e| ValidationError::new("body", e.to_string()))
}

pub fn validate_buyer_id(buyer_id: i64) -> ValidationResult {
    if buyer_id <= 0 {
        return Err(ValidationError::new("buyer_id", "must be a positive identifier"));
    }

    Ok(())
}

pub fn validate_quantity(field: &'static str, quantity: i64) -> ValidationResult {
    if quantity < MIN_LINE_QUANTITY {
        return Err(ValidationError::new(
            field,
            format!("must be at least {}", MIN_LINE_QUANTITY),
        ));
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::new(
            field,
            format!("must be at most {}", MAX_LINE_QUANTITY),
        ));
    }

    Ok(())
}

/// Checks a basket and merges repeated products into a single entry.
///
/// The returned basket keeps the order in which each product first appeared.
pub fn validate_basket(items: &[BasketItem]) -> Result<Vec<BasketItem>, ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::new("products", "must not be empty"));
    }

    if items.len() > MAX_BASKET_ITEMS {
        return Err(ValidationError::new(
            "products",
            format!("must contain at most {} items", MAX_BASKET_ITEMS),
        ));
    }

    let mut merged: Vec<BasketItem> = Vec::with_capacity(items.len());
    for item in items {
        validate_quantity("quantity", item.quantity)?;

        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity += item.quantity;
                validate_quantity("quantity", existing.quantity)?;
            }
            None => merged.push(item.clone()),
        }
    }

    Ok(merged)
}

pub fn validate_place_order(request: &PlaceOrderRequest) -> Result<Vec<BasketItem>, ValidationError> {
    validate_buyer_id(request.buyer_id)?;
    validate_basket(&request.products)
}
