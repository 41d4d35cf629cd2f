//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: builds the catalog service from configuration
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use catalog_infra::CatalogService;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(catalog: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(catalog))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::log_requests)))
}
