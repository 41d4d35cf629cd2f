//! Infrastructure layer: product storage, the postal-code lookup client,
//! configuration, and the catalog service that composes them.

pub mod address;
pub mod catalog;
pub mod config;
pub mod store;

pub use address::{AddressLookup, ViaCepClient};
pub use catalog::{CatalogError, CatalogService};
pub use config::{AppConfig, ConfigError};
pub use store::{InMemoryProductStore, PostgresProductStore, ProductStore, StoreError};
