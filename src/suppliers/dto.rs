use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Supplier;
use crate::patch::double_option;

#[derive(Debug, Deserialize)]
pub struct CreateSupplierRequest {
    pub name: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Partial update; nullable fields accept an explicit `null` to clear them.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSupplierRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub cnpj: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub state: Option<Option<String>>,
}

impl UpdateSupplierRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.cnpj.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Supplier> for SupplierResponse {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.id,
            name: s.name,
            cnpj: s.cnpj,
            email: s.email,
            phone: s.phone,
            address: s.address,
            city: s.city,
            state: s.state,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_with_no_fields_is_empty() {
        let req: UpdateSupplierRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());

        let req: UpdateSupplierRequest =
            serde_json::from_str(r#"{"city": "Recife"}"#).unwrap();
        assert!(!req.is_empty());
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let req: UpdateSupplierRequest = serde_json::from_str(r#"{"cnpj": null}"#).unwrap();
        assert_eq!(req.cnpj, Some(None));
        assert!(req.email.is_none());
        assert!(!req.is_empty());
    }
}
