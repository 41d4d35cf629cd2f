//! Postal-code lookup boundary.
//!
//! Lookups fail softly: an unreachable upstream, a non-success status, a
//! malformed body or an explicit "no such code" answer all come back as
//! `None` / an empty list. Callers never see transport errors, and nothing is
//! retried or cached.

use std::sync::Arc;

use async_trait::async_trait;

use catalog_products::AddressRecord;

pub mod viacep;

pub use viacep::ViaCepClient;

#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolve a single postal code.
    async fn resolve_by_postal_code(&self, postal_code: &str) -> Option<AddressRecord>;

    /// Search by state, city and street.
    ///
    /// Order is whatever the upstream returns; it is not a relevance ranking.
    async fn resolve_by_address(&self, state: &str, city: &str, street: &str) -> Vec<AddressRecord>;
}

#[async_trait]
impl<L> AddressLookup for Arc<L>
where
    L: AddressLookup + ?Sized,
{
    async fn resolve_by_postal_code(&self, postal_code: &str) -> Option<AddressRecord> {
        (**self).resolve_by_postal_code(postal_code).await
    }

    async fn resolve_by_address(&self, state: &str, city: &str, street: &str) -> Vec<AddressRecord> {
        (**self).resolve_by_address(state, city, street).await
    }
}
