//! `catalog-core`: domain building blocks shared by the catalog crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::ProductId;
