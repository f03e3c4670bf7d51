use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Product;
use crate::patch::double_option;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub sku: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub active: bool,
    pub description: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
}

/// Partial update; nullable fields accept an explicit `null` to clear them
/// (detach a supplier or category, drop the description).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub supplier_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "double_option")]
    pub subcategory_id: Option<Option<Uuid>>,
}

impl UpdateProductRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.active.is_none()
            && self.description.is_none()
            && self.supplier_id.is_none()
            && self.category_id.is_none()
            && self.subcategory_id.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            sku: p.sku,
            name: p.name,
            price: p.price,
            active: p.active,
            description: p.description,
            supplier_id: p.supplier_id,
            category_id: p.category_id,
            subcategory_id: p.subcategory_id,
            stock_quantity: p.stock_quantity,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_defaults_to_false_on_create() {
        let req: CreateProductRequest =
            serde_json::from_str(r#"{"sku": "X1", "name": "Widget", "price": 10.0}"#).unwrap();
        assert!(!req.active);
        assert!(req.supplier_id.is_none());
    }

    #[test]
    fn partial_update_only_sets_sent_fields() {
        let req: UpdateProductRequest = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        assert_eq!(req.price, Some(12.5));
        assert!(req.name.is_none());
        assert!(!req.is_empty());
    }

    #[test]
    fn partial_update_null_detaches_supplier() {
        let req: UpdateProductRequest =
            serde_json::from_str(r#"{"supplier_id": null}"#).unwrap();
        assert_eq!(req.supplier_id, Some(None));
        assert!(req.description.is_none());
    }
}
