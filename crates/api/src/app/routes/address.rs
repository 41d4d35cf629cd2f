use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use catalog_infra::CatalogService;

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/by-postal-code/:code", get(get_by_postal_code))
        .route("/search", get(search_postal_code))
}

pub async fn get_by_postal_code(
    Extension(catalog): Extension<Arc<CatalogService>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    match catalog.resolve_postal_code(&code).await {
        Some(record) => (StatusCode::OK, Json(record)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "address not found"),
    }
}

/// Postal code of the first upstream match for a state/city/street triple.
pub async fn search_postal_code(
    Extension(catalog): Extension<Arc<CatalogService>>,
    query: Result<Query<dto::AddressSearchQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match catalog
        .find_postal_code(&query.state, &query.city, &query.street)
        .await
    {
        Some(postal_code) => {
            (StatusCode::OK, Json(serde_json::json!({ "postalCode": postal_code }))).into_response()
        }
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "no postal code for address"),
    }
}
