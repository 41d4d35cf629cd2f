use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_infra::{CatalogError, StoreError};

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        CatalogError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        CatalogError::Store(StoreError::Duplicate(msg)) => json_error(StatusCode::CONFLICT, "conflict", msg),
        CatalogError::Store(e) => {
            tracing::error!("store failure: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
