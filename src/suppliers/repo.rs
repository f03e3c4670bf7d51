use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const SUPPLIER_COLUMNS: &str =
    "id, name, cnpj, email, phone, address, city, state, created_at, updated_at";

pub struct NewSupplier<'a> {
    pub name: &'a str,
    pub cnpj: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
}

/// Partial update. The name is mandatory in the schema so it only takes a
/// plain `Option`; for the nullable columns the outer `Option` means "was
/// the field sent" and `Some(None)` clears the column.
pub struct SupplierPatch<'a> {
    pub name: Option<&'a str>,
    pub cnpj: Option<Option<&'a str>>,
    pub email: Option<Option<&'a str>>,
    pub phone: Option<Option<&'a str>>,
    pub address: Option<Option<&'a str>>,
    pub city: Option<Option<&'a str>>,
    pub state: Option<Option<&'a str>>,
}

impl Supplier {
    pub async fn create(db: &PgPool, new: NewSupplier<'_>) -> Result<Supplier, ApiError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO fornecedores (name, cnpj, email, phone, address, city, state)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(new.name)
        .bind(new.cnpj)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.address)
        .bind(new.city)
        .bind(new.state)
        .fetch_one(db)
        .await?;
        Ok(supplier)
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Supplier>, ApiError> {
        let rows = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS}
            FROM fornecedores
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

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Supplier>, ApiError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM fornecedores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(supplier)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: SupplierPatch<'_>,
    ) -> Result<Option<Supplier>, ApiError> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE fornecedores
            SET name       = COALESCE($2, name),
                cnpj       = CASE WHEN $3 THEN $4 ELSE cnpj END,
                email      = CASE WHEN $5 THEN $6 ELSE email END,
                phone      = CASE WHEN $7 THEN $8 ELSE phone END,
                address    = CASE WHEN $9 THEN $10 ELSE address END,
                city       = CASE WHEN $11 THEN $12 ELSE city END,
                state      = CASE WHEN $13 THEN $14 ELSE state END,
                updated_at = now()
            WHERE id = $1
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.cnpj.is_some())
        .bind(patch.cnpj.flatten())
        .bind(patch.email.is_some())
        .bind(patch.email.flatten())
        .bind(patch.phone.is_some())
        .bind(patch.phone.flatten())
        .bind(patch.address.is_some())
        .bind(patch.address.flatten())
        .bind(patch.city.is_some())
        .bind(patch.city.flatten())
        .bind(patch.state.is_some())
        .bind(patch.state.flatten())
        .fetch_optional(db)
        .await?;
        Ok(supplier)
    }

    /// Products referencing the supplier keep existing with a null
    /// supplier_id (ON DELETE SET NULL).
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM fornecedores WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
