use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{RefreshRequest, TokenRequest, TokenResponse},
        jwt::{CurrentUser, JwtKeys},
        password::verify_password,
    },
    error::ApiError,
    state::AppState,
    users::{dto::UserResponse, repo::User},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(issue_token))
        .route("/auth/refresh", post(refresh_token))
        .route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(mut payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "token request for unknown email");
            ApiError::Unauthorized("Incorrect email or password".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "token request with invalid password");
        return Err(ApiError::Unauthorized("Incorrect email or password".into()));
    }

    if !user.is_active {
        warn!(user_id = %user.id, "token request for inactive user");
        return Err(ApiError::Unauthorized("User is inactive".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, "token issued");
    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}

#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    // The user may have been deleted since the refresh token was issued
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, "token refreshed");
    Ok(Json(TokenResponse::bearer(access_token, refresh_token)))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
