//! Book endpoints

use axum::{
    extract::{OriginalUri, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    Json,
};

use crate::{
    criteria::BookCriteria,
    error::{AppError, AppResult},
    models::book::{Book, BookInput, BookPatch},
    pagination::pagination_headers,
};

use super::{
    alert,
    extract::{AppJson, CriteriaQuery, EagerLoad, EagerLoadParams, PageParams, PageRequest},
};

const ENTITY_NAME: &str = "book";

/// Create a new book, linking the given authors and categories
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input, id already set or unknown author/category", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AppJson(input): AppJson<BookInput>,
) -> AppResult<(StatusCode, HeaderMap, Json<Book>)> {
    tracing::debug!("REST request to save Book : {:?}", input);
    if input.id.is_some() {
        return Err(AppError::bad_request_alert(
            "A new book cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let created = state.services.books.save(input).await?;

    let mut headers = alert::entity_creation_alert(&state.config.app, ENTITY_NAME, created.id);
    if let Ok(location) = HeaderValue::from_str(&format!("/api/books/{}", created.id)) {
        headers.insert(LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(created)))
}

/// Replace an existing book, links included
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input or id", body = crate::error::ErrorResponse),
        (status = 409, description = "ISBN already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    AppJson(input): AppJson<BookInput>,
) -> AppResult<(HeaderMap, Json<Book>)> {
    tracing::debug!("REST request to update Book : {}, {:?}", id, input);
    super::check_ids(ENTITY_NAME, id, input.id)?;
    if !state.services.books.exists(id).await? {
        return Err(AppError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound"));
    }

    let updated = state.services.books.save(input).await?;
    let headers = alert::entity_update_alert(&state.config.app, ENTITY_NAME, updated.id);
    Ok((headers, Json(updated)))
}

/// Update the given fields of an existing book; links are kept
#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = BookPatch,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid id", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn partial_update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<BookPatch>,
) -> AppResult<(HeaderMap, Json<Book>)> {
    tracing::debug!("REST request to partial update Book : {}, {:?}", id, patch);
    super::check_ids(ENTITY_NAME, id, patch.id)?;
    if !state.services.books.exists(id).await? {
        return Err(AppError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound"));
    }

    let updated = state
        .services
        .books
        .partial_update(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))?;
    let headers = alert::entity_update_alert(&state.config.app, ENTITY_NAME, id);
    Ok((headers, Json(updated)))
}

/// List books matching the criteria
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(PageParams, EagerLoadParams),
    responses(
        (status = 200, description = "Page of books", body = Vec<Book>),
        (status = 400, description = "Invalid filter or sort", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    OriginalUri(uri): OriginalUri,
    eager: EagerLoad,
    CriteriaQuery(criteria): CriteriaQuery<BookCriteria>,
    PageRequest(pageable): PageRequest,
) -> AppResult<(HeaderMap, Json<Vec<Book>>)> {
    tracing::debug!("REST request to get Books by criteria: {:?}", criteria);
    let page = state
        .services
        .books
        .find_by_criteria(&criteria, &pageable, eager.0.unwrap_or(false))
        .await?;
    let headers = pagination_headers(uri.path(), uri.query(), &page);
    Ok((headers, Json(page.content)))
}

/// Count books matching the criteria
#[utoipa::path(
    get,
    path = "/books/count",
    tag = "books",
    responses((status = 200, description = "Number of matching books", body = i64))
)]
pub async fn count_books(
    State(state): State<crate::AppState>,
    CriteriaQuery(criteria): CriteriaQuery<BookCriteria>,
) -> AppResult<Json<i64>> {
    tracing::debug!("REST request to count Books by criteria: {:?}", criteria);
    let count = state.services.books.count_by_criteria(&criteria).await?;
    Ok(Json(count))
}

/// Get a book with its authors and categories
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Book>> {
    tracing::debug!("REST request to get Book : {}", id);
    state
        .services
        .books
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, HeaderMap)> {
    tracing::debug!("REST request to delete Book : {}", id);
    state.services.books.delete(id).await?;
    let headers = alert::entity_deletion_alert(&state.config.app, ENTITY_NAME, id);
    Ok((StatusCode::NO_CONTENT, headers))
}
