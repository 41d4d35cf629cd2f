//! Products domain module.
//!
//! This crate contains business rules for the catalog, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod address;
pub mod availability;
pub mod product;
pub mod ranking;

pub use address::AddressRecord;
pub use availability::is_available;
pub use product::{NewProduct, Product, ProductUpdate};
pub use ranking::{DEFAULT_TOP_N, top_by_price};
