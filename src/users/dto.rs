use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::User;
use crate::patch::double_option;

/// Request body for signup.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Partial profile update. Username, email and password are immutable here;
/// the password has its own endpoint. Nullable fields use a nested `Option`
/// so an explicit `null` clears the column while a missing key leaves it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.is_active.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// Public part of the user returned to clients. Never carries the hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            phone: u.phone,
            is_active: u.is_active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_treats_missing_fields_as_unset() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"phone": "123"}"#).unwrap();
        assert_eq!(req.phone, Some(Some("123".into())));
        assert!(req.first_name.is_none());
        assert!(!req.is_empty());

        let empty: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn update_request_null_clears_a_field() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        assert_eq!(req.phone, Some(None));
        assert!(!req.is_empty());
    }

    #[test]
    fn response_never_serializes_password_hash() {
        let resp = UserResponse {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            first_name: None,
            last_name: None,
            phone: None,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("alice@example.com"));
        assert!(!json.contains("password"));
    }
}
