use axum::Json;
use utoipa::OpenApi;

use crate::domain::{
    BasketItem, Order, OrderDetail, OrderLine, OrderLineDetail, OrderSummary, PlaceOrderRequest,
    Product,
};
use crate::handlers::{self, HealthStatus};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::orders::place_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::products::list_products,
        handlers::products::get_product,
    ),
    components(schemas(
        PlaceOrderRequest,
        BasketItem,
        Order,
        OrderLine,
        OrderSummary,
        OrderDetail,
        OrderLineDetail,
        Product,
        HealthStatus,
    )),
    tags(
        (name = "Orders", description = "Order placement and lookup"),
        (name = "Products", description = "Catalog lookup"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/orders", "/orders/{id}", "/products", "/products/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
