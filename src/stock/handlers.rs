use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, error::ApiError, pagination::Pagination, state::AppState};

use super::{
    dto::{MovementFilter, MovementResponse, RecordMovementRequest, UpdateMovementRequest},
    repo::{NewMovement, StockMovement},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/estoque", get(list_movements).post(record_movement))
        .route(
            "/estoque/:id",
            get(get_movement).patch(update_movement).delete(delete_movement),
        )
}

#[instrument(skip(state, payload))]
pub async fn record_movement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<RecordMovementRequest>,
) -> Result<(StatusCode, Json<MovementResponse>), ApiError> {
    if payload.quantity < 1 {
        return Err(ApiError::Validation("Quantity must be at least 1".into()));
    }

    let movement = StockMovement::record(
        &state.db,
        NewMovement {
            product_id: payload.product_id,
            quantity: payload.quantity,
            direction: payload.direction,
            occurred_at: payload.occurred_at.unwrap_or_else(OffsetDateTime::now_utc),
            note: payload.note.as_deref(),
        },
    )
    .await?;

    info!(
        movement_id = %movement.id,
        product_id = %movement.product_id,
        quantity = movement.quantity,
        direction = ?movement.direction,
        "stock movement recorded"
    );
    Ok((StatusCode::CREATED, Json(MovementResponse::from(movement))))
}

#[instrument(skip(state))]
pub async fn list_movements(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(p): Query<Pagination>,
    Query(filter): Query<MovementFilter>,
) -> Result<Json<Vec<MovementResponse>>, ApiError> {
    let (limit, offset) = p.clamped();
    let movements = StockMovement::list(&state.db, filter.product_id, limit, offset).await?;
    Ok(Json(
        movements.into_iter().map(MovementResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_movement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MovementResponse>, ApiError> {
    let movement = StockMovement::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Stock movement not found".into()))?;
    Ok(Json(MovementResponse::from(movement)))
}

#[instrument(skip(state, payload))]
pub async fn update_movement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMovementRequest>,
) -> Result<Json<MovementResponse>, ApiError> {
    let movement = StockMovement::update_note(&state.db, id, &payload.note)
        .await?
        .ok_or_else(|| ApiError::NotFound("Stock movement not found".into()))?;

    info!(movement_id = %movement.id, "movement note updated");
    Ok(Json(MovementResponse::from(movement)))
}

#[instrument(skip(state))]
pub async fn delete_movement(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    StockMovement::revert(&state.db, id).await?;
    info!(movement_id = %id, "stock movement reverted");
    Ok(StatusCode::NO_CONTENT)
}
