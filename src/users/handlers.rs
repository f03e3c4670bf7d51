use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::AuthUser,
        password::hash_password,
    },
    error::ApiError,
    pagination::Pagination,
    state::AppState,
    validation::is_valid_email,
};

use super::{
    dto::{CreateUserRequest, UpdatePasswordRequest, UpdateUserRequest, UserResponse},
    repo::{User, UserPatch},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", get(get_user).patch(update_user).delete(delete_user))
        .route("/users/:id/password", patch(update_password))
}

fn validate_signup(payload: &CreateUserRequest) -> Result<(), ApiError> {
    if payload.username.trim().len() < 3 {
        return Err(ApiError::Validation(
            "Username must be at least 3 characters".into(),
        ));
    }
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();
    validate_signup(&payload)?;

    let hash = hash_password(&payload.password)?;
    // Username/email uniqueness is enforced by the database; a duplicate
    // surfaces as 409 through the sqlx error mapping.
    let user = User::create(&state.db, &payload.username, &payload.email, &hash).await?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let (limit, offset) = p.clamped();
    let users = User::list(&state.db, limit, offset).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation("No fields to update".into()));
    }

    let user = User::update(
        &state.db,
        id,
        UserPatch {
            first_name: payload.first_name.as_ref().map(|o| o.as_deref()),
            last_name: payload.last_name.as_ref().map(|o| o.as_deref()),
            phone: payload.phone.as_ref().map(|o| o.as_deref()),
            is_active: payload.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if payload.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::update_password(&state.db, id, &hash)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "password updated");
    Ok(Json(UserResponse::from(user)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !User::delete(&state.db, id).await? {
        warn!(user_id = %id, "delete for unknown user");
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(username: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn signup_validation_accepts_good_input() {
        assert!(validate_signup(&req("alice", "alice@example.com", "long-enough")).is_ok());
    }

    #[test]
    fn signup_validation_rejects_short_username() {
        let err = validate_signup(&req("ab", "a@b.co", "long-enough")).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn signup_validation_rejects_bad_email() {
        assert!(validate_signup(&req("alice", "not-an-email", "long-enough")).is_err());
    }

    #[test]
    fn signup_validation_rejects_short_password() {
        assert!(validate_signup(&req("alice", "a@b.co", "short")).is_err());
    }
}
