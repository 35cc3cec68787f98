use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bigdecimal::BigDecimal;
use serde_json::{json, Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::ports::StoreError;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Product {product_id} not found")]
    ProductNotFound { product_id: Uuid },

    #[error("Account {buyer_id} not found")]
    AccountNotFound { buyer_id: i64 },

    #[error("Not enough stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientFunds {
        required: BigDecimal,
        available: BigDecimal,
    },

    #[error("Order processing failed: {0}")]
    OrderProcessingFailed(String),

    #[error("Not found: {0}")]
    NotFoundOrForbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            AppError::OrderProcessingFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFoundOrForbidden(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable discriminator carried in every error body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::ProductNotFound { .. } => "ProductNotFound",
            AppError::AccountNotFound { .. } => "AccountNotFound",
            AppError::InsufficientStock { .. } => "InsufficientStock",
            AppError::InsufficientFunds { .. } => "InsufficientFunds",
            AppError::OrderProcessingFailed(_) => "OrderProcessingFailed",
            AppError::NotFoundOrForbidden(_) => "NotFoundOrForbidden",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Database(_) => "DatabaseError",
        }
    }

    fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        match self {
            AppError::Validation(e) => {
                details.insert("field".into(), json!(e.field));
            }
            AppError::ProductNotFound { product_id } => {
                details.insert("product_id".into(), json!(product_id));
            }
            AppError::AccountNotFound { buyer_id } => {
                details.insert("buyer_id".into(), json!(buyer_id));
            }
            AppError::InsufficientStock {
                product_id,
                requested,
                available,
            } => {
                details.insert("product_id".into(), json!(product_id));
                details.insert("requested".into(), json!(requested));
                details.insert("available".into(), json!(available));
            }
            AppError::InsufficientFunds {
                required,
                available,
            } => {
                details.insert("required".into(), json!(required.to_string()));
                details.insert("available".into(), json!(available.to_string()));
            }
            _ => {}
        }
        details
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Database(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Request failed");
        }

        let mut body = self.details();
        body.insert("error".into(), json!(self.to_string()));
        body.insert("kind".into(), json!(self.kind()));
        body.insert("status".into(), json!(status.as_u16()));

        (status, Json(Value::Object(body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::Validation(ValidationError::new("products", "must not be empty"));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.kind(), "ValidationError");
    }

    #[test]
    fn test_not_found_status_codes() {
        let product = AppError::ProductNotFound {
            product_id: Uuid::new_v4(),
        };
        let order = AppError::NotFoundOrForbidden("Order OD1 not found".to_string());
        let account = AppError::AccountNotFound { buyer_id: 4 };

        assert_eq!(product.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(order.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(account.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_insufficiency_status_codes() {
        let stock = AppError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 5,
            available: 2,
        };
        let funds = AppError::InsufficientFunds {
            required: BigDecimal::from(500),
            available: BigDecimal::from(100),
        };

        assert_eq!(stock.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(funds.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_processing_failure_status_code() {
        let error = AppError::OrderProcessingFailed("connection reset".to_string());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_status_code() {
        let error = AppError::Unauthorized("missing x-buyer-id header".to_string());
        assert_eq!(error.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_insufficient_funds_details() {
        let error = AppError::InsufficientFunds {
            required: BigDecimal::from(500),
            available: BigDecimal::from(100),
        };
        let details = error.details();

        assert_eq!(details["required"], "500");
        assert_eq!(details["available"], "100");
    }

    #[tokio::test]
    async fn test_insufficient_stock_response() {
        let error = AppError::InsufficientStock {
            product_id: Uuid::new_v4(),
            requested: 5,
            available: 2,
        };
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_store_error_maps_to_database_error() {
        let error: AppError = StoreError::Database("pool timed out".to_string()).into();
        let response = error.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
