use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::domain::{Order, OrderDetail, OrderSummary, PlaceOrderRequest};
use crate::error::AppError;
use crate::middleware::Buyer;
use crate::validation;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid basket, insufficient stock or insufficient funds"),
        (status = 404, description = "Unknown product or account"),
        (status = 500, description = "Order processing failed")
    ),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let request: PlaceOrderRequest = validation::parse_strict(&body)?;

    // Detached so a client disconnect cannot cut the transaction short.
    let service = state.orders.clone();
    let order = tokio::spawn(async move { service.place_order(request).await })
        .await
        .map_err(|e| AppError::OrderProcessingFailed(format!("order task failed: {}", e)))??;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/orders",
    params(("x-buyer-id" = i64, Header, description = "Authenticated buyer")),
    responses(
        (status = 200, description = "Orders of the caller, most recent first", body = [OrderSummary]),
        (status = 401, description = "Missing caller identity")
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Buyer(buyer_id): Buyer,
) -> Result<impl IntoResponse, AppError> {
    let orders = state.orders.list_orders(buyer_id).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = String, Path, description = "Order code"),
        ("x-buyer-id" = i64, Header, description = "Authenticated buyer")
    ),
    responses(
        (status = 200, description = "Order detail", body = OrderDetail),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Order absent or owned by someone else")
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Buyer(buyer_id): Buyer,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.get_order(buyer_id, &id).await?;
    Ok(Json(order))
}
