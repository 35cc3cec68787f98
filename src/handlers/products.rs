use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::domain::Product;
use crate::error::AppError;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/products",
    responses((status = 200, description = "Catalog", body = [Product])),
    tag = "Products"
)]
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product uuid")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.catalog.get_product(id).await?;
    Ok(Json(product))
}
