use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, error::ApiError, pagination::Pagination, state::AppState};

use super::{
    dto::{CreateProductRequest, ProductResponse, UpdateProductRequest},
    repo::{NewProduct, Product, ProductPatch},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/produtos", get(list_products).post(create_product))
        .route(
            "/produtos/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    if payload.sku.trim().is_empty() {
        return Err(ApiError::Validation("SKU is required".into()));
    }
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Product name is required".into()));
    }
    if payload.price < 0.0 {
        return Err(ApiError::Validation("Price must not be negative".into()));
    }

    // Duplicate SKU surfaces as 409, unknown supplier or category ids
    // as 422, all through the sqlx error mapping
    let product = Product::create(
        &state.db,
        NewProduct {
            sku: payload.sku.trim(),
            name: payload.name.trim(),
            price: payload.price,
            active: payload.active,
            description: payload.description.as_deref(),
            supplier_id: payload.supplier_id,
            category_id: payload.category_id,
            subcategory_id: payload.subcategory_id,
        },
    )
    .await?;

    info!(product_id = %product.id, sku = %product.sku, "product created");
    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let (limit, offset) = p.clamped();
    let products = Product::list(&state.db, limit, offset).await?;
    Ok(Json(
        products.into_iter().map(ProductResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;
    Ok(Json(ProductResponse::from(product)))
}

#[instrument(skip(state, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation("No fields to update".into()));
    }
    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(ApiError::Validation("Price must not be negative".into()));
        }
    }

    let product = Product::update(
        &state.db,
        id,
        ProductPatch {
            name: payload.name.as_deref(),
            price: payload.price,
            active: payload.active,
            description: payload.description.as_ref().map(|o| o.as_deref()),
            supplier_id: payload.supplier_id,
            category_id: payload.category_id,
            subcategory_id: payload.subcategory_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    info!(product_id = %product.id, "product updated");
    Ok(Json(ProductResponse::from(product)))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product not found".into()));
    }
    info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
