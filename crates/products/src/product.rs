use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, ProductId};

/// Input for registering a new product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price: i64,
    pub category: String,
    /// City/region the product ships from. Blank is treated as absent.
    pub distribution_center: Option<String>,
}

/// Input for changing the mutable attributes of an existing product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
}

impl ProductUpdate {
    /// Check name and price without touching any product.
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)
    }
}

/// A catalog product.
///
/// `active == false` marks a soft-deleted product: it is hidden from active
/// listings but still retrievable by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
    pub category: String,
    pub distribution_center: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Build a new, active product from validated input.
    pub fn create(id: ProductId, input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        validate_name(&input.name)?;
        validate_price(input.price)?;
        if input.category.trim().is_empty() {
            return Err(DomainError::validation("category must not be empty"));
        }

        Ok(Self {
            id,
            name: input.name,
            price: input.price,
            category: input.category,
            distribution_center: normalize_optional(input.distribution_center),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace name and price. Nothing changes if validation fails.
    pub fn apply_update(&mut self, update: &ProductUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        if update.id != self.id {
            return Err(DomainError::invalid_id(format!(
                "update targets {} but product is {}",
                update.id, self.id
            )));
        }
        update.validate()?;

        self.name = update.name.clone();
        self.price = update.price;
        self.updated_at = now;
        Ok(())
    }

    /// Soft-delete. Returns `false` if the product was already inactive.
    pub fn deactivate(&mut self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.updated_at = now;
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn distribution_center(&self) -> Option<&str> {
        self.distribution_center.as_deref()
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    Ok(())
}

fn validate_price(price: i64) -> DomainResult<()> {
    if price < 0 {
        return Err(DomainError::validation("price must be non-negative"));
    }
    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
