//! Postgres-backed product store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Unavailable` |
//! | ColumnDecode / ColumnNotFound | N/A | `Corrupt` |
//! | Other | N/A | `Unavailable` |
//!
//! ## Ordering
//!
//! Rows carry a `seq BIGSERIAL` column; listings order by it so results come
//! back in insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use catalog_core::ProductId;
use catalog_products::Product;

use super::{ProductStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        seq                 BIGSERIAL,
        id                  TEXT PRIMARY KEY,
        name                TEXT NOT NULL,
        price               BIGINT NOT NULL CHECK (price >= 0),
        category            TEXT NOT NULL,
        distribution_center TEXT NULL,
        active              BOOLEAN NOT NULL DEFAULT TRUE,
        created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS products_category_idx ON products (category)",
    "CREATE INDEX IF NOT EXISTS products_active_seq_idx ON products (active, seq)",
];

const SELECT_COLUMNS: &str =
    "id, name, price, category, distribution_center, active, created_at, updated_at";

/// Postgres-backed product store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
/// Every operation is a single statement; isolation is whatever Postgres gives
/// a lone statement.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` with default pool settings.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table and its indexes if missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip_all, fields(product_id = %product.id), err)]
    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id,
                name,
                price,
                category,
                distribution_center,
                active,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.category)
        .bind(product.distribution_center.as_deref())
        .bind(product.active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(())
    }

    #[instrument(skip_all, fields(product_id = %id), err)]
    async fn get(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE active ORDER BY seq ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_active", e))?;

        rows.iter().map(row_to_product).collect()
    }

    #[instrument(skip_all, fields(category = %category), err)]
    async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE category = $1 ORDER BY seq ASC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_by_category", e))?;

        rows.iter().map(row_to_product).collect()
    }

    #[instrument(skip_all, fields(product_id = %id), err)]
    async fn update_details(
        &self,
        id: &ProductId,
        name: &str,
        price: i64,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET name = $2,
                price = $3,
                updated_at = $4
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(id.as_str())
        .bind(name)
        .bind(price)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_details", e))?;

        row.as_ref().map(row_to_product).transpose()
    }

    #[instrument(skip_all, fields(product_id = %id), err)]
    async fn deactivate(&self, id: &ProductId, updated_at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET active = FALSE,
                updated_at = CASE WHEN active THEN $2 ELSE updated_at END
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("deactivate", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_product(row: &PgRow) -> Result<Product, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Corrupt(format!("failed to decode product row: {e}"));

    Ok(Product {
        id: ProductId::from(row.try_get::<String, _>("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        price: row.try_get("price").map_err(decode)?,
        category: row.try_get("category").map_err(decode)?,
        distribution_center: row.try_get("distribution_center").map_err(decode)?,
        active: row.try_get("active").map_err(decode)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Unique violation
                Some("23505") => StoreError::Duplicate(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        e @ (sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_)) => {
            StoreError::Corrupt(format!("{operation}: {e}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}
