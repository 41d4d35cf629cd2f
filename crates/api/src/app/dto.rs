use serde::Deserialize;

use catalog_core::{DomainError, ProductId};
use catalog_products::{NewProduct, Product, ProductUpdate};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
    pub category: String,
    #[serde(default)]
    pub distribution_center: Option<String>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(body: CreateProductRequest) -> Self {
        NewProduct {
            name: body.name,
            price: body.price,
            category: body.category,
            distribution_center: body.distribution_center,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub id: String,
    pub name: String,
    pub price: i64,
}

impl TryFrom<UpdateProductRequest> for ProductUpdate {
    type Error = DomainError;

    fn try_from(body: UpdateProductRequest) -> Result<Self, Self::Error> {
        Ok(ProductUpdate {
            id: body.id.parse::<ProductId>()?,
            name: body.name,
            price: body.price,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct TopByPriceQuery {
    pub n: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub postal_code: String,
}

#[derive(Debug, Deserialize)]
pub struct AddressSearchQuery {
    pub state: String,
    pub city: String,
    pub street: String,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.as_str(),
        "name": p.name,
        "price": p.price,
        "category": p.category,
        "distributionCenter": p.distribution_center,
        "active": p.active,
        "createdAt": p.created_at,
        "updatedAt": p.updated_at,
    })
}

pub fn products_to_json(products: Vec<Product>) -> serde_json::Value {
    serde_json::Value::Array(products.into_iter().map(product_to_json).collect())
}
