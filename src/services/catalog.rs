use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Product;
use crate::error::AppError;
use crate::ports::CatalogStore;

/// Read-only product lookups backing the storefront listing pages.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.store.list_products().await?)
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Product, AppError> {
        self.store
            .find_product(product_id)
            .await?
            .ok_or(AppError::ProductNotFound { product_id })
    }
}
