use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser, error::ApiError, pagination::Pagination, state::AppState,
    validation::is_valid_email,
};

use super::{
    dto::{CreateSupplierRequest, SupplierResponse, UpdateSupplierRequest},
    repo::{NewSupplier, Supplier, SupplierPatch},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fornecedores", get(list_suppliers).post(create_supplier))
        .route(
            "/fornecedores/:id",
            get(get_supplier).patch(update_supplier).delete(delete_supplier),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<(StatusCode, Json<SupplierResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Supplier name is required".into()));
    }
    if let Some(email) = payload.email.as_deref() {
        if !is_valid_email(email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
    }

    // Duplicate CNPJ surfaces as 409 through the sqlx error mapping
    let supplier = Supplier::create(
        &state.db,
        NewSupplier {
            name: payload.name.trim(),
            cnpj: payload.cnpj.as_deref(),
            email: payload.email.as_deref(),
            phone: payload.phone.as_deref(),
            address: payload.address.as_deref(),
            city: payload.city.as_deref(),
            state: payload.state.as_deref(),
        },
    )
    .await?;

    info!(supplier_id = %supplier.id, "supplier created");
    Ok((StatusCode::CREATED, Json(SupplierResponse::from(supplier))))
}

#[instrument(skip(state))]
pub async fn list_suppliers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<SupplierResponse>>, ApiError> {
    let (limit, offset) = p.clamped();
    let suppliers = Supplier::list(&state.db, limit, offset).await?;
    Ok(Json(
        suppliers.into_iter().map(SupplierResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplierResponse>, ApiError> {
    let supplier = Supplier::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Supplier not found".into()))?;
    Ok(Json(SupplierResponse::from(supplier)))
}

#[instrument(skip(state, payload))]
pub async fn update_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<Json<SupplierResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation("No fields to update".into()));
    }
    if let Some(Some(email)) = payload.email.as_ref().map(|o| o.as_deref()) {
        if !is_valid_email(email) {
            return Err(ApiError::Validation("Invalid email".into()));
        }
    }

    let supplier = Supplier::update(
        &state.db,
        id,
        SupplierPatch {
            name: payload.name.as_deref(),
            cnpj: payload.cnpj.as_ref().map(|o| o.as_deref()),
            email: payload.email.as_ref().map(|o| o.as_deref()),
            phone: payload.phone.as_ref().map(|o| o.as_deref()),
            address: payload.address.as_ref().map(|o| o.as_deref()),
            city: payload.city.as_ref().map(|o| o.as_deref()),
            state: payload.state.as_ref().map(|o| o.as_deref()),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Supplier not found".into()))?;

    info!(supplier_id = %supplier.id, "supplier updated");
    Ok(Json(SupplierResponse::from(supplier)))
}

#[instrument(skip(state))]
pub async fn delete_supplier(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Supplier::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Supplier not found".into()));
    }
    info!(supplier_id = %id, "supplier deleted");
    Ok(StatusCode::NO_CONTENT)
}
