use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use catalog_core::ProductId;
use catalog_infra::{CatalogError, CatalogService};
use catalog_products::{ProductUpdate, DEFAULT_TOP_N};

use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_products).post(create_product).put(update_product),
        )
        .route("/by-category", get(list_by_category))
        .route("/top-by-price", get(top_by_price))
        .route("/:id", get(get_product).delete(delete_product))
        .route("/:id/availability", get(check_availability))
}

/// Ids arriving in paths and bodies must not be blank.
fn parse_id(raw: &str) -> Result<ProductId, Response> {
    raw.parse::<ProductId>()
        .map_err(|e| errors::catalog_error_to_response(CatalogError::from(e)))
}

pub async fn list_products(
    Extension(catalog): Extension<Arc<CatalogService>>,
) -> Response {
    match catalog.list_active().await {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(items))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_by_category(
    Extension(catalog): Extension<Arc<CatalogService>>,
    query: Result<Query<dto::CategoryQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match catalog.list_by_category(&query.category).await {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(items))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn top_by_price(
    Extension(catalog): Extension<Arc<CatalogService>>,
    query: Result<Query<dto::TopByPriceQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    match catalog.top_by_price(query.n.unwrap_or(DEFAULT_TOP_N)).await {
        Ok(items) => (StatusCode::OK, Json(dto::products_to_json(items))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(catalog): Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match catalog.get(&id).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(catalog): Extension<Arc<CatalogService>>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match catalog.create(body.into()).await {
        Ok(product) => (StatusCode::CREATED, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(catalog): Extension<Arc<CatalogService>>,
    body: Result<Json<dto::UpdateProductRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let update = match ProductUpdate::try_from(body) {
        Ok(update) => update,
        Err(e) => return errors::catalog_error_to_response(CatalogError::from(e)),
    };

    match catalog.update(update).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(catalog): Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match catalog.soft_delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn check_availability(
    Extension(catalog): Extension<Arc<CatalogService>>,
    Path(id): Path<String>,
    query: Result<Query<dto::AvailabilityQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };

    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match catalog
        .check_availability(&id, &query.postal_code)
        .await
    {
        Ok(available) => {
            (StatusCode::OK, Json(serde_json::json!({ "available": available }))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}
