//! Product storage boundary.
//!
//! `ProductStore` is the only way the catalog touches persistence. Two
//! implementations ship: an in-memory store for dev/tests and a Postgres store.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use chrono::{DateTime, Utc};

use catalog_core::ProductId;
use catalog_products::Product;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A product with the same identifier already exists.
    #[error("duplicate product id: {0}")]
    Duplicate(String),

    /// The backing store could not serve the request (connection, lock, IO).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be mapped back into a product.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Persistence for products.
///
/// Listings preserve insertion order. Each write touches only the columns its
/// operation owns, so a rename never resurrects a soft-deleted product and a
/// soft-delete never reverts a rename. There is no version check: two renames
/// of the same product race and the last one wins.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: Product) -> Result<(), StoreError>;

    /// Fetch by id regardless of the active flag.
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    async fn list_active(&self) -> Result<Vec<Product>, StoreError>;

    /// Exact category match, active and inactive alike.
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError>;

    /// Set name, price and `updated_at`, leaving every other column alone.
    ///
    /// Returns the stored product after the write, or `None` when no product
    /// with that id exists.
    async fn update_details(
        &self,
        id: &ProductId,
        name: &str,
        price: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError>;

    /// Clear the active flag. `updated_at` only moves if the product was active.
    ///
    /// Returns `false` when no product with that id exists.
    async fn deactivate(&self, id: &ProductId, updated_at: DateTime<Utc>) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        (**self).insert(product).await
    }

    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_active().await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        (**self).list_by_category(category).await
    }

    async fn update_details(
        &self,
        id: &ProductId,
        name: &str,
        price: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        (**self).update_details(id, name, price, updated_at).await
    }

    async fn deactivate(&self, id: &ProductId, updated_at: DateTime<Utc>) -> Result<bool, StoreError> {
        (**self).deactivate(id, updated_at).await
    }
}
