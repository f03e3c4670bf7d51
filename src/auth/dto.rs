use serde::{Deserialize, Serialize};

/// Request body for the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned by the token and refresh endpoints.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_serializes_bearer_type() {
        let resp = TokenResponse::bearer("a".into(), "r".into());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["access_token"], "a");
        assert_eq!(json["refresh_token"], "r");
    }
}
