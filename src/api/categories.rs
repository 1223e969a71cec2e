//! Category endpoints

use axum::{
    extract::{OriginalUri, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    Json,
};

use crate::{
    criteria::CategoryCriteria,
    error::{AppError, AppResult},
    models::category::{Category, CategoryInput, CategoryPatch},
    pagination::pagination_headers,
};

use super::{
    alert,
    extract::{AppJson, CriteriaQuery, PageParams, PageRequest},
};

const ENTITY_NAME: &str = "category";

/// Create a new category
#[utoipa::path(
    post,
    path = "/categories",
    tag = "categories",
    request_body = CategoryInput,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid input or id already set", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_category(
    State(state): State<crate::AppState>,
    AppJson(input): AppJson<CategoryInput>,
) -> AppResult<(StatusCode, HeaderMap, Json<Category>)> {
    tracing::debug!("REST request to save Category : {:?}", input);
    if input.id.is_some() {
        return Err(AppError::bad_request_alert(
            "A new category cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let created = state.services.categories.save(input).await?;

    let mut headers = alert::entity_creation_alert(&state.config.app, ENTITY_NAME, created.id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/categories/{}", created.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)))
}

/// Replace an existing category
#[utoipa::path(
    put,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = CategoryInput,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid input or id", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    AppJson(input): AppJson<CategoryInput>,
) -> AppResult<(HeaderMap, Json<Category>)> {
    tracing::debug!("REST request to update Category : {}, {:?}", id, input);
    super::check_ids(ENTITY_NAME, id, input.id)?;
    if !state.services.categories.exists(id).await? {
        return Err(AppError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound"));
    }

    let updated = state.services.categories.save(input).await?;
    let headers = alert::entity_update_alert(&state.config.app, ENTITY_NAME, updated.id);
    Ok((headers, Json(updated)))
}

/// Update the given fields of an existing category
#[utoipa::path(
    patch,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = CategoryPatch,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid id", body = crate::error::ErrorResponse),
        (status = 404, description = "Category not found")
    )
)]
pub async fn partial_update_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<CategoryPatch>,
) -> AppResult<(HeaderMap, Json<Category>)> {
    tracing::debug!("REST request to partial update Category : {}, {:?}", id, patch);
    super::check_ids(ENTITY_NAME, id, patch.id)?;
    if !state.services.categories.exists(id).await? {
        return Err(AppError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound"));
    }

    let updated = state
        .services
        .categories
        .partial_update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
    let headers = alert::entity_update_alert(&state.config.app, ENTITY_NAME, id);
    Ok((headers, Json(updated)))
}

/// List categories matching the criteria
#[utoipa::path(
    get,
    path = "/categories",
    tag = "categories",
    params(PageParams),
    responses(
        (status = 200, description = "Page of categories", body = Vec<Category>),
        (status = 400, description = "Invalid filter or sort", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_categories(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    CriteriaQuery(criteria): CriteriaQuery<CategoryCriteria>,
    PageRequest(pageable): PageRequest,
) -> AppResult<(HeaderMap, Json<Vec<Category>>)> {
    tracing::debug!("REST request to get Categories by criteria: {:?}", criteria);
    let page = state.services.categories.find_by_criteria(&criteria, &pageable).await?;
    let headers = pagination_headers(uri.path(), uri.query(), &page);
    Ok((headers, Json(page.content)))
}

/// Count categories matching the criteria
#[utoipa::path(
    get,
    path = "/categories/count",
    tag = "categories",
    responses((status = 200, description = "Number of matching categories", body = i64))
)]
pub async fn count_categories(
    State(state): State<crate::AppState>,
    CriteriaQuery(criteria): CriteriaQuery<CategoryCriteria>,
) -> AppResult<Json<i64>> {
    tracing::debug!("REST request to count Categories by criteria: {:?}", criteria);
    let count = state.services.categories.count_by_criteria(&criteria).await?;
    Ok(Json(count))
}

/// Get a category with its books
#[utoipa::path(
    get,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category details", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    tracing::debug!("REST request to get Category : {}", id);
    state
        .services
        .categories
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
}

/// Delete a category; its book links go with it
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    tag = "categories",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, HeaderMap)> {
    tracing::debug!("REST request to delete Category : {}", id);
    state.services.categories.delete(id).await?;
    let headers = alert::entity_deletion_alert(&state.config.app, ENTITY_NAME, id);
    Ok((StatusCode::NO_CONTENT, headers))
}
