use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use catalog_core::ProductId;
use catalog_products::Product;

use super::{ProductStore, StoreError};

/// In-memory product store.
///
/// Intended for tests/dev. Vector order is insertion order; lookups are linear.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("in-memory product store lock poisoned".to_string())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(|_| Self::poisoned())?;
        if products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Duplicate(product.id.into_string()));
        }
        products.push(product);
        Ok(())
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(products.iter().filter(|p| p.active).cloned().collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(|_| Self::poisoned())?;
        Ok(products
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn update_details(
        &self,
        id: &ProductId,
        name: &str,
        price: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.write().map_err(|_| Self::poisoned())?;
        Ok(products.iter_mut().find(|p| &p.id == id).map(|existing| {
            existing.name = name.to_string();
            existing.price = price;
            existing.updated_at = updated_at;
            existing.clone()
        }))
    }

    async fn deactivate(&self, id: &ProductId, updated_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut products = self.products.write().map_err(|_| Self::poisoned())?;
        match products.iter_mut().find(|p| &p.id == id) {
            Some(existing) => {
                existing.deactivate(updated_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
