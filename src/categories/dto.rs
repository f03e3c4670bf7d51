use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Category, SubCategory};
use crate::patch::double_option;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl UpdateCategoryRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSubCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSubCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub category_id: Option<Uuid>,
}

impl UpdateSubCategoryRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.category_id.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubCategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SubCategory> for SubCategoryResponse {
    fn from(s: SubCategory) -> Self {
        Self {
            id: s.id,
            name: s.name,
            description: s.description,
            category_id: s.category_id,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// The single-category view carries its subcategories inline.
#[derive(Debug, Serialize)]
pub struct CategoryDetailResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub subcategories: Vec<SubCategoryResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_with_no_fields_is_empty() {
        let req: UpdateCategoryRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
    }

    #[test]
    fn update_request_null_clears_the_description() {
        let req: UpdateCategoryRequest =
            serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(req.description, Some(None));
        assert!(!req.is_empty());
    }

    #[test]
    fn subcategory_update_can_move_to_another_category() {
        let id = Uuid::new_v4();
        let req: UpdateSubCategoryRequest =
            serde_json::from_str(&format!(r#"{{"category_id": "{id}"}}"#)).unwrap();
        assert_eq!(req.category_id, Some(id));
        assert!(req.name.is_none());
    }
}
