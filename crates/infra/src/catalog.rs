//! Catalog orchestration (application-level service).
//!
//! `CatalogService` composes a `ProductStore` and an `AddressLookup` that are
//! handed to it at construction. It holds no state of its own; every call is
//! a single request/response against those collaborators.
//!
//! Two behaviours are kept on purpose:
//!
//! - `list_by_category` does not filter on the active flag, unlike
//!   `list_active`, so soft-deleted products still show up there.
//! - `update` has no version check. Two concurrent updates of the same product
//!   both succeed and the last write wins.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use catalog_core::{DomainError, ProductId};
use catalog_products::{AddressRecord, NewProduct, Product, ProductUpdate, is_available, top_by_price};

use crate::address::AddressLookup;
use crate::store::{ProductStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested product does not exist.
    #[error("product not found")]
    NotFound,
    /// The input was rejected before touching the store.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for CatalogError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => CatalogError::Validation(msg),
            DomainError::InvalidId(msg) => CatalogError::Validation(msg),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
    lookup: Arc<dyn AddressLookup>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ProductStore>, lookup: Arc<dyn AddressLookup>) -> Self {
        Self { store, lookup }
    }

    /// Active products in insertion order.
    pub async fn list_active(&self) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_active().await?)
    }

    /// Products whose category equals `category` exactly, including soft-deleted ones.
    pub async fn list_by_category(&self, category: &str) -> CatalogResult<Vec<Product>> {
        Ok(self.store.list_by_category(category).await?)
    }

    /// Fetch a product regardless of its active flag.
    pub async fn get(&self, id: &ProductId) -> CatalogResult<Product> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// The `n` most expensive active products, price descending, ties in insertion order.
    pub async fn top_by_price(&self, n: usize) -> CatalogResult<Vec<Product>> {
        let active = self.store.list_active().await?;
        Ok(top_by_price(active, n))
    }

    pub async fn create(&self, input: NewProduct) -> CatalogResult<Product> {
        let product = Product::create(ProductId::new(), input, Utc::now())?;
        self.store.insert(product.clone()).await?;
        tracing::info!(product_id = %product.id, category = %product.category, "product created");
        Ok(product)
    }

    /// Replace name and price of an existing product.
    ///
    /// Only those two columns (plus `updated_at`) are written, so a concurrent
    /// soft-delete stays in effect.
    pub async fn update(&self, update: ProductUpdate) -> CatalogResult<Product> {
        update.validate()?;

        let mut product = self.get(&update.id).await?;
        product.apply_update(&update, Utc::now())?;

        let stored = self
            .store
            .update_details(&product.id, &product.name, product.price, product.updated_at)
            .await?
            .ok_or(CatalogError::NotFound)?;
        tracing::info!(product_id = %stored.id, "product updated");
        Ok(stored)
    }

    /// Mark a product inactive. Succeeds again if it already is.
    pub async fn soft_delete(&self, id: &ProductId) -> CatalogResult<()> {
        let product = self.get(id).await?;
        if !product.is_active() {
            tracing::debug!(product_id = %id, "product already inactive");
            return Ok(());
        }

        if !self.store.deactivate(id, Utc::now()).await? {
            return Err(CatalogError::NotFound);
        }
        tracing::info!(product_id = %id, "product soft-deleted");
        Ok(())
    }

    /// Whether `product_id` ships to the city `postal_code` resolves to.
    ///
    /// A postal code that cannot be resolved yields `false`, not an error.
    pub async fn check_availability(&self, product_id: &ProductId, postal_code: &str) -> CatalogResult<bool> {
        let product = self.get(product_id).await?;

        let Some(center) = product.distribution_center() else {
            tracing::debug!(product_id = %product_id, "product has no distribution center");
            return Ok(false);
        };

        let address = self.lookup.resolve_by_postal_code(postal_code).await;
        let city = address.as_ref().and_then(AddressRecord::city);
        let available = is_available(city, Some(center));

        tracing::debug!(
            product_id = %product_id,
            postal_code,
            resolved_city = city.unwrap_or(""),
            available,
            "availability checked"
        );
        Ok(available)
    }

    pub async fn resolve_postal_code(&self, postal_code: &str) -> Option<AddressRecord> {
        self.lookup.resolve_by_postal_code(postal_code).await
    }

    /// Postal code of the first record the upstream returns for an address.
    ///
    /// "First" is best effort only; the upstream order is not a relevance ranking.
    pub async fn find_postal_code(&self, state: &str, city: &str, street: &str) -> Option<String> {
        self.lookup
            .resolve_by_address(state, city, street)
            .await
            .into_iter()
            .next()
            .and_then(|record| record.postal_code)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use chrono::DateTime;

    use super::*;
    use crate::store::InMemoryProductStore;

    /// Address lookup double: fixed answers, records every postal code asked for.
    #[derive(Default)]
    struct StubLookup {
        city: Option<String>,
        search: Vec<AddressRecord>,
        calls: Mutex<Vec<String>>,
    }

    impl StubLookup {
        fn resolving_to(city: &str) -> Self {
            Self {
                city: Some(city.to_string()),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AddressLookup for StubLookup {
        async fn resolve_by_postal_code(&self, postal_code: &str) -> Option<AddressRecord> {
            self.calls.lock().unwrap().push(postal_code.to_string());
            self.city.as_ref().map(|city| AddressRecord {
                postal_code: Some(postal_code.to_string()),
                city: Some(city.clone()),
                ..AddressRecord::default()
            })
        }

        async fn resolve_by_address(&self, _state: &str, _city: &str, _street: &str) -> Vec<AddressRecord> {
            self.search.clone()
        }
    }

    fn setup(lookup: StubLookup) -> (CatalogService, Arc<InMemoryProductStore>, Arc<StubLookup>) {
        let store = Arc::new(InMemoryProductStore::new());
        let lookup = Arc::new(lookup);
        let service = CatalogService::new(store.clone(), lookup.clone());
        (service, store, lookup)
    }

    fn new_product(name: &str, price: i64, category: &str, center: Option<&str>) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price,
            category: category.to_string(),
            distribution_center: center.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_active_product() {
        let (service, _, _) = setup(StubLookup::default());

        let created = service
            .create(new_product("Desk", 900, "furniture", Some("Curitiba")))
            .await
            .unwrap();
        let fetched = service.get(&created.id).await.unwrap();

        assert!(fetched.active);
        assert_eq!(fetched.name, "Desk");
        assert_eq!(fetched.price, 900);
        assert_eq!(fetched.category, "furniture");
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_storing() {
        let (service, store, _) = setup(StubLookup::default());

        let err = service
            .create(new_product("Desk", -5, "furniture", None))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Validation(_)));
        assert!(store.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (service, _, _) = setup(StubLookup::default());
        let err = service.get(&ProductId::from("missing")).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound);
    }

    #[tokio::test]
    async fn soft_deleted_products_leave_active_listing_but_stay_retrievable() {
        let (service, _, _) = setup(StubLookup::default());
        let keep = service.create(new_product("Keep", 1, "a", None)).await.unwrap();
        let gone = service.create(new_product("Gone", 2, "a", None)).await.unwrap();

        service.soft_delete(&gone.id).await.unwrap();

        let active = service.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, keep.id);

        let fetched = service.get(&gone.id).await.unwrap();
        assert!(!fetched.active);
    }

    #[tokio::test]
    async fn soft_delete_is_idempotent() {
        let (service, _, _) = setup(StubLookup::default());
        let product = service.create(new_product("Lamp", 10, "home", None)).await.unwrap();

        service.soft_delete(&product.id).await.unwrap();
        service.soft_delete(&product.id).await.unwrap();

        assert!(!service.get(&product.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn soft_delete_unknown_id_is_not_found() {
        let (service, _, _) = setup(StubLookup::default());
        let err = service.soft_delete(&ProductId::from("missing")).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound);
    }

    #[tokio::test]
    async fn category_listing_includes_soft_deleted_products() {
        let (service, _, _) = setup(StubLookup::default());
        let a = service.create(new_product("A", 1, "books", None)).await.unwrap();
        let b = service.create(new_product("B", 1, "books", None)).await.unwrap();
        service.create(new_product("C", 1, "toys", None)).await.unwrap();
        service.soft_delete(&b.id).await.unwrap();

        let ids: Vec<_> = service
            .list_by_category("books")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn top_by_price_ignores_inactive_and_limits() {
        let (service, _, _) = setup(StubLookup::default());
        for price in [10, 70, 30, 50, 20, 60, 40] {
            service.create(new_product("P", price, "x", None)).await.unwrap();
        }
        let priciest = service.create(new_product("Gold", 1_000, "x", None)).await.unwrap();
        service.soft_delete(&priciest.id).await.unwrap();

        let prices: Vec<_> = service
            .top_by_price(5)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.price)
            .collect();
        assert_eq!(prices, vec![70, 60, 50, 40, 30]);
    }

    #[tokio::test]
    async fn update_changes_name_and_price() {
        let (service, _, _) = setup(StubLookup::default());
        let product = service.create(new_product("Old", 5, "x", Some("Curitiba"))).await.unwrap();

        let updated = service
            .update(ProductUpdate {
                id: product.id.clone(),
                name: "New".to_string(),
                price: 8,
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "New");
        assert_eq!(updated.price, 8);
        let stored = service.get(&product.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found_and_leaves_store_unchanged() {
        let (service, _, _) = setup(StubLookup::default());
        let existing = service.create(new_product("Keep", 5, "x", None)).await.unwrap();

        let err = service
            .update(ProductUpdate {
                id: ProductId::from("missing"),
                name: "Ghost".to_string(),
                price: 1,
            })
            .await
            .unwrap_err();

        assert_eq!(err, CatalogError::NotFound);
        assert_eq!(service.list_active().await.unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let (service, _, _) = setup(StubLookup::default());
        let err = service
            .update(ProductUpdate {
                id: ProductId::from("missing"),
                name: " ".to_string(),
                price: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn availability_matches_city_case_insensitively() {
        let (service, _, lookup) = setup(StubLookup::resolving_to("curitiba"));
        let product = service
            .create(new_product("Bike", 1, "sport", Some("Curitiba")))
            .await
            .unwrap();

        assert!(service.check_availability(&product.id, "80010000").await.unwrap());
        assert_eq!(lookup.calls(), vec!["80010000".to_string()]);
    }

    #[tokio::test]
    async fn availability_is_false_for_other_city() {
        let (service, _, _) = setup(StubLookup::resolving_to("Sao Paulo"));
        let product = service
            .create(new_product("Bike", 1, "sport", Some("Curitiba")))
            .await
            .unwrap();

        assert!(!service.check_availability(&product.id, "01001000").await.unwrap());
    }

    #[tokio::test]
    async fn availability_is_false_when_postal_code_unresolvable() {
        let (service, _, _) = setup(StubLookup::default());
        let product = service
            .create(new_product("Bike", 1, "sport", Some("Curitiba")))
            .await
            .unwrap();

        assert!(!service.check_availability(&product.id, "00000000").await.unwrap());
    }

    #[tokio::test]
    async fn availability_without_distribution_center_skips_lookup() {
        let (service, _, lookup) = setup(StubLookup::resolving_to("Curitiba"));
        let product = service.create(new_product("Bike", 1, "sport", None)).await.unwrap();

        assert!(!service.check_availability(&product.id, "80010000").await.unwrap());
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn availability_for_unknown_product_is_not_found() {
        let (service, _, lookup) = setup(StubLookup::resolving_to("Curitiba"));
        let err = service
            .check_availability(&ProductId::from("missing"), "80010000")
            .await
            .unwrap_err();

        assert_eq!(err, CatalogError::NotFound);
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn find_postal_code_takes_first_record() {
        let lookup = StubLookup {
            search: vec![
                AddressRecord {
                    postal_code: Some("80020-310".to_string()),
                    ..AddressRecord::default()
                },
                AddressRecord {
                    postal_code: Some("80020-320".to_string()),
                    ..AddressRecord::default()
                },
            ],
            ..StubLookup::default()
        };
        let (service, _, _) = setup(lookup);

        let code = service.find_postal_code("PR", "Curitiba", "Rua XV").await;
        assert_eq!(code.as_deref(), Some("80020-310"));
    }

    #[tokio::test]
    async fn find_postal_code_with_no_records_is_none() {
        let (service, _, _) = setup(StubLookup::default());
        assert!(service.find_postal_code("PR", "Curitiba", "Nowhere").await.is_none());
    }

    /// Store double that lets another request write right after `get` has read.
    struct InterleavingStore {
        inner: InMemoryProductStore,
        after_get: Interleave,
    }

    #[derive(Clone, Copy)]
    enum Interleave {
        SoftDelete,
        Rename,
    }

    #[async_trait]
    impl ProductStore for InterleavingStore {
        async fn insert(&self, product: Product) -> Result<(), StoreError> {
            self.inner.insert(product).await
        }

        async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
            let read = self.inner.get(id).await?;
            match self.after_get {
                Interleave::SoftDelete => {
                    self.inner.deactivate(id, Utc::now()).await?;
                }
                Interleave::Rename => {
                    self.inner.update_details(id, "Renamed elsewhere", 77, Utc::now()).await?;
                }
            }
            Ok(read)
        }

        async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
            self.inner.list_active().await
        }

        async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
            self.inner.list_by_category(category).await
        }

        async fn update_details(
            &self,
            id: &ProductId,
            name: &str,
            price: i64,
            updated_at: DateTime<Utc>,
        ) -> Result<Option<Product>, StoreError> {
            self.inner.update_details(id, name, price, updated_at).await
        }

        async fn deactivate(&self, id: &ProductId, updated_at: DateTime<Utc>) -> Result<bool, StoreError> {
            self.inner.deactivate(id, updated_at).await
        }
    }

    async fn interleaving(after_get: Interleave) -> (CatalogService, Arc<InterleavingStore>, Product) {
        let store = Arc::new(InterleavingStore {
            inner: InMemoryProductStore::new(),
            after_get,
        });
        let product = Product::create(
            ProductId::from("p-1"),
            new_product("Chair", 100, "furniture", Some("Curitiba")),
            Utc::now(),
        )
        .unwrap();
        store.insert(product.clone()).await.unwrap();

        let service = CatalogService::new(store.clone(), Arc::new(StubLookup::default()));
        (service, store, product)
    }

    #[tokio::test]
    async fn update_does_not_undo_a_concurrent_soft_delete() {
        let (service, store, product) = interleaving(Interleave::SoftDelete).await;

        let updated = service
            .update(ProductUpdate {
                id: product.id.clone(),
                name: "Armchair".to_string(),
                price: 150,
            })
            .await
            .unwrap();

        assert!(!updated.active);
        let stored = store.inner.get(&product.id).await.unwrap().unwrap();
        assert!(!stored.active);
        assert_eq!(stored.name, "Armchair");
        assert_eq!(stored.price, 150);
    }

    #[tokio::test]
    async fn soft_delete_does_not_undo_a_concurrent_rename() {
        let (service, store, product) = interleaving(Interleave::Rename).await;

        service.soft_delete(&product.id).await.unwrap();

        let stored = store.inner.get(&product.id).await.unwrap().unwrap();
        assert!(!stored.active);
        assert_eq!(stored.name, "Renamed elsewhere");
        assert_eq!(stored.price, 77);
    }

    #[tokio::test]
    async fn blank_update_id_is_a_validation_error() {
        let err = CatalogError::from("  ".parse::<ProductId>().unwrap_err());
        assert!(matches!(err, CatalogError::Validation(_)));
    }
}
