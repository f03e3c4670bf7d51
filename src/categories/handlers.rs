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
    dto::{
        CategoryDetailResponse, CategoryResponse, CreateCategoryRequest,
        CreateSubCategoryRequest, SubCategoryResponse, UpdateCategoryRequest,
        UpdateSubCategoryRequest,
    },
    repo::{Category, CategoryPatch, SubCategory, SubCategoryPatch},
};

pub fn router() -> Router<AppState> {
    // /categorias/subcategorias is a static segment, so it never collides
    // with the /categorias/:id capture.
    Router::new()
        .route(
            "/categorias/subcategorias",
            get(list_subcategories).post(create_subcategory),
        )
        .route(
            "/categorias/subcategorias/:id",
            get(get_subcategory)
                .patch(update_subcategory)
                .delete(delete_subcategory),
        )
        .route("/categorias", get(list_categories).post(create_category))
        .route(
            "/categorias/:id",
            get(get_category).patch(update_category).delete(delete_category),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Category name is required".into()));
    }

    // Duplicate name surfaces as 409 through the sqlx error mapping
    let category =
        Category::create(&state.db, payload.name.trim(), payload.description.as_deref())
            .await?;

    info!(category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let (limit, offset) = p.clamped();
    let categories = Category::list(&state.db, limit, offset).await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryDetailResponse>, ApiError> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;
    let subcategories = SubCategory::list_for_category(&state.db, id).await?;
    Ok(Json(CategoryDetailResponse {
        category: CategoryResponse::from(category),
        subcategories: subcategories
            .into_iter()
            .map(SubCategoryResponse::from)
            .collect(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation("No fields to update".into()));
    }

    let category = Category::update(
        &state.db,
        id,
        CategoryPatch {
            name: payload.name.as_deref(),
            description: payload.description.as_ref().map(|o| o.as_deref()),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Category not found".into()))?;

    info!(category_id = %category.id, "category updated");
    Ok(Json(CategoryResponse::from(category)))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Category::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Category not found".into()));
    }
    info!(category_id = %id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, payload))]
pub async fn create_subcategory(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<CreateSubCategoryRequest>,
) -> Result<(StatusCode, Json<SubCategoryResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Subcategory name is required".into()));
    }

    // Unknown category_id surfaces as 422, duplicate name within the
    // category as 409, both through the sqlx error mapping
    let subcategory = SubCategory::create(
        &state.db,
        payload.name.trim(),
        payload.description.as_deref(),
        payload.category_id,
    )
    .await?;

    info!(subcategory_id = %subcategory.id, "subcategory created");
    Ok((
        StatusCode::CREATED,
        Json(SubCategoryResponse::from(subcategory)),
    ))
}

#[instrument(skip(state))]
pub async fn list_subcategories(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<SubCategoryResponse>>, ApiError> {
    let (limit, offset) = p.clamped();
    let subcategories = SubCategory::list(&state.db, limit, offset).await?;
    Ok(Json(
        subcategories
            .into_iter()
            .map(SubCategoryResponse::from)
            .collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_subcategory(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SubCategoryResponse>, ApiError> {
    let subcategory = SubCategory::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Subcategory not found".into()))?;
    Ok(Json(SubCategoryResponse::from(subcategory)))
}

#[instrument(skip(state, payload))]
pub async fn update_subcategory(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSubCategoryRequest>,
) -> Result<Json<SubCategoryResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation("No fields to update".into()));
    }

    let subcategory = SubCategory::update(
        &state.db,
        id,
        SubCategoryPatch {
            name: payload.name.as_deref(),
            description: payload.description.as_ref().map(|o| o.as_deref()),
            category_id: payload.category_id,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Subcategory not found".into()))?;

    info!(subcategory_id = %subcategory.id, "subcategory updated");
    Ok(Json(SubCategoryResponse::from(subcategory)))
}

#[instrument(skip(state))]
pub async fn delete_subcategory(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !SubCategory::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Subcategory not found".into()));
    }
    info!(subcategory_id = %id, "subcategory deleted");
    Ok(StatusCode::NO_CONTENT)
}
