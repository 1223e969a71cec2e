//! Author endpoints

use axum::{
    extract::{OriginalUri, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    Json,
};

use crate::{
    criteria::AuthorCriteria,
    error::{AppError, AppResult},
    models::author::{Author, AuthorInput, AuthorPatch},
    pagination::pagination_headers,
};

use super::{
    alert,
    extract::{AppJson, CriteriaQuery, PageParams, PageRequest},
};

const ENTITY_NAME: &str = "author";

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input or id already set", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    AppJson(input): AppJson<AuthorInput>,
) -> AppResult<(StatusCode, HeaderMap, Json<Author>)> {
    tracing::debug!("REST request to save Author : {:?}", input);
    if input.id.is_some() {
        return Err(AppError::bad_request_alert(
            "A new author cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let created = state.services.authors.save(input).await?;

    let mut headers = alert::entity_creation_alert(&state.config.app, ENTITY_NAME, created.id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/authors/{}", created.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)))
}

/// Replace an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input or id", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    AppJson(input): AppJson<AuthorInput>,
) -> AppResult<(HeaderMap, Json<Author>)> {
    tracing::debug!("REST request to update Author : {}, {:?}", id, input);
    super::check_ids(ENTITY_NAME, id, input.id)?;
    if !state.services.authors.exists(id).await? {
        return Err(AppError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound"));
    }

    let updated = state.services.authors.save(input).await?;
    let headers = alert::entity_update_alert(&state.config.app, ENTITY_NAME, updated.id);
    Ok((headers, Json(updated)))
}

/// Update the given fields of an existing author
#[utoipa::path(
    patch,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    request_body = AuthorPatch,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid id", body = crate::error::ErrorResponse),
        (status = 404, description = "Author not found")
    )
)]
pub async fn partial_update_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<AuthorPatch>,
) -> AppResult<(HeaderMap, Json<Author>)> {
    tracing::debug!("REST request to partial update Author : {}, {:?}", id, patch);
    super::check_ids(ENTITY_NAME, id, patch.id)?;
    if !state.services.authors.exists(id).await? {
        return Err(AppError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound"));
    }

    let updated = state
        .services
        .authors
        .partial_update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))?;
    let headers = alert::entity_update_alert(&state.config.app, ENTITY_NAME, id);
    Ok((headers, Json(updated)))
}

/// List authors matching the criteria
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(PageParams),
    responses(
        (status = 200, description = "Page of authors", body = Vec<Author>),
        (status = 400, description = "Invalid filter or sort", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    CriteriaQuery(criteria): CriteriaQuery<AuthorCriteria>,
    PageRequest(pageable): PageRequest,
) -> AppResult<(HeaderMap, Json<Vec<Author>>)> {
    tracing::debug!("REST request to get Authors by criteria: {:?}", criteria);
    let page = state.services.authors.find_by_criteria(&criteria, &pageable).await?;
    let headers = pagination_headers(uri.path(), uri.query(), &page);
    Ok((headers, Json(page.content)))
}

/// Count authors matching the criteria
#[utoipa::path(
    get,
    path = "/authors/count",
    tag = "authors",
    responses((status = 200, description = "Number of matching authors", body = i64))
)]
pub async fn count_authors(
    State(state): State<crate::AppState>,
    CriteriaQuery(criteria): CriteriaQuery<AuthorCriteria>,
) -> AppResult<Json<i64>> {
    tracing::debug!("REST request to count Authors by criteria: {:?}", criteria);
    let count = state.services.authors.count_by_criteria(&criteria).await?;
    Ok(Json(count))
}

/// Get an author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author details", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Author>> {
    tracing::debug!("REST request to get Author : {}", id);
    state
        .services
        .authors
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
}

/// Delete an author; their book links go with them
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, HeaderMap)> {
    tracing::debug!("REST request to delete Author : {}", id);
    state.services.authors.delete(id).await?;
    let headers = alert::entity_deletion_alert(&state.config.app, ENTITY_NAME, id);
    Ok((StatusCode::NO_CONTENT, headers))
}
