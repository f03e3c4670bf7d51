use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub price: f64,
    pub active: bool,
    pub description: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub stock_quantity: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const PRODUCT_COLUMNS: &str =
    "id, sku, name, price, active, description, supplier_id, category_id, subcategory_id, \
     stock_quantity, created_at, updated_at";

pub struct NewProduct<'a> {
    pub sku: &'a str,
    pub name: &'a str,
    pub price: f64,
    pub active: bool,
    pub description: Option<&'a str>,
    pub supplier_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
}

/// Partial update. Nullable columns take a nested `Option`: the outer one
/// says whether the field was sent, `Some(None)` clears the column. The SKU
/// and the stock quantity are never updated here: the SKU is immutable and
/// the quantity only moves through stock movements.
pub struct ProductPatch<'a> {
    pub name: Option<&'a str>,
    pub price: Option<f64>,
    pub active: Option<bool>,
    pub description: Option<Option<&'a str>>,
    pub supplier_id: Option<Option<Uuid>>,
    pub category_id: Option<Option<Uuid>>,
    pub subcategory_id: Option<Option<Uuid>>,
}

impl Product {
    pub async fn create(db: &PgPool, new: NewProduct<'_>) -> Result<Product, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO produtos
                (sku, name, price, active, description, supplier_id, category_id, subcategory_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(new.sku)
        .bind(new.name)
        .bind(new.price)
        .bind(new.active)
        .bind(new.description)
        .bind(new.supplier_id)
        .bind(new.category_id)
        .bind(new.subcategory_id)
        .fetch_one(db)
        .await?;
        Ok(product)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Product>, ApiError> {
        let rows = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM produtos
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM produtos WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn find_by_sku(db: &PgPool, sku: &str) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM produtos WHERE sku = $1"
        ))
        .bind(sku)
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: ProductPatch<'_>,
    ) -> Result<Option<Product>, ApiError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE produtos
            SET name           = COALESCE($2, name),
                price          = COALESCE($3, price),
                active         = COALESCE($4, active),
                description    = CASE WHEN $5 THEN $6 ELSE description END,
                supplier_id    = CASE WHEN $7 THEN $8 ELSE supplier_id END,
                category_id    = CASE WHEN $9 THEN $10 ELSE category_id END,
                subcategory_id = CASE WHEN $11 THEN $12 ELSE subcategory_id END,
                updated_at     = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.price)
        .bind(patch.active)
        .bind(patch.description.is_some())
        .bind(patch.description.flatten())
        .bind(patch.supplier_id.is_some())
        .bind(patch.supplier_id.flatten())
        .bind(patch.category_id.is_some())
        .bind(patch.category_id.flatten())
        .bind(patch.subcategory_id.is_some())
        .bind(patch.subcategory_id.flatten())
        .fetch_optional(db)
        .await?;
        Ok(product)
    }

    /// Movements referencing the product are removed with it
    /// (ON DELETE CASCADE).
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM produtos WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
