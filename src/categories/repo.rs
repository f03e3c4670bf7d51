use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";
const SUBCATEGORY_COLUMNS: &str =
    "id, name, description, category_id, created_at, updated_at";

/// Partial update; `Some(None)` on description clears it.
pub struct CategoryPatch<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
}

pub struct SubCategoryPatch<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub category_id: Option<Uuid>,
}

impl Category {
    pub async fn create(
        db: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, ApiError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categorias (name, description)
            VALUES ($1, $2)
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .fetch_one(db)
        .await?;
        Ok(category)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Category>, ApiError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            r#"
            SELECT {CATEGORY_COLUMNS}
            FROM categorias
            ORDER BY name ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categorias WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(category)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: CategoryPatch<'_>,
    ) -> Result<Option<Category>, ApiError> {
        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categorias
            SET name        = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                updated_at  = now()
            WHERE id = $1
            RETURNING {CATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.description.is_some())
        .bind(patch.description.flatten())
        .fetch_optional(db)
        .await?;
        Ok(category)
    }

    /// Subcategories go with the category (ON DELETE CASCADE); products
    /// keep existing with a null category_id (ON DELETE SET NULL).
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM categorias WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl SubCategory {
    pub async fn create(
        db: &PgPool,
        name: &str,
        description: Option<&str>,
        category_id: Uuid,
    ) -> Result<SubCategory, ApiError> {
        let subcategory = sqlx::query_as::<_, SubCategory>(&format!(
            r#"
            INSERT INTO subcategorias (name, description, category_id)
            VALUES ($1, $2, $3)
            RETURNING {SUBCATEGORY_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(description)
        .bind(category_id)
        .fetch_one(db)
        .await?;
        Ok(subcategory)
    }

    pub async fn list(
        db: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubCategory>, ApiError> {
        let rows = sqlx::query_as::<_, SubCategory>(&format!(
            r#"
            SELECT {SUBCATEGORY_COLUMNS}
            FROM subcategorias
            ORDER BY name ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_category(
        db: &PgPool,
        category_id: Uuid,
    ) -> Result<Vec<SubCategory>, ApiError> {
        let rows = sqlx::query_as::<_, SubCategory>(&format!(
            r#"
            SELECT {SUBCATEGORY_COLUMNS}
            FROM subcategorias
            WHERE category_id = $1
            ORDER BY name ASC
            "#
        ))
        .bind(category_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<SubCategory>, ApiError> {
        let subcategory = sqlx::query_as::<_, SubCategory>(&format!(
            "SELECT {SUBCATEGORY_COLUMNS} FROM subcategorias WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(subcategory)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: SubCategoryPatch<'_>,
    ) -> Result<Option<SubCategory>, ApiError> {
        let subcategory = sqlx::query_as::<_, SubCategory>(&format!(
            r#"
            UPDATE subcategorias
            SET name        = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                category_id = COALESCE($5, category_id),
                updated_at  = now()
            WHERE id = $1
            RETURNING {SUBCATEGORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.description.is_some())
        .bind(patch.description.flatten())
        .bind(patch.category_id)
        .fetch_optional(db)
        .await?;
        Ok(subcategory)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM subcategorias WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
