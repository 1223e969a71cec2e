//! Public read-only catalog

use axum::{
    extract::{OriginalUri, Path, State},
    http::HeaderMap,
    Json,
};

use crate::{
    criteria::BookCriteria,
    error::{AppError, AppResult},
    models::{Author, Book, Category},
    pagination::pagination_headers,
};

use super::extract::{CriteriaQuery, EagerLoad, EagerLoadParams, PageParams, PageRequest};

/// Browse the catalog. Authors and categories are included unless `eagerload=false`.
#[utoipa::path(
    get,
    path = "/library/books",
    tag = "library",
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
    tracing::debug!("REST request to browse Books by criteria: {:?}", criteria);
    let page = state
        .services
        .books
        .find_by_criteria(&criteria, &pageable, eager.0.unwrap_or(true))
        .await?;
    let headers = pagination_headers(uri.path(), uri.query(), &page);
    Ok((headers, Json(page.content)))
}

#[utoipa::path(
    get,
    path = "/library/books/{isbn}/isbn",
    tag = "library",
    params(("isbn" = String, Path, description = "Book ISBN")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "No book with this ISBN")
    )
)]
pub async fn get_book_by_isbn(
    State(state): State<crate::AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<Book>> {
    tracing::debug!("REST request to get Book by isbn : {}", isbn);
    state
        .services
        .books
        .find_one_by_isbn(&isbn)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Book with isbn {} not found", isbn)))
}

#[utoipa::path(
    get,
    path = "/library/categories/{id}",
    tag = "library",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category with its books", body = Category),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    state
        .services
        .categories
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
}

#[utoipa::path(
    get,
    path = "/library/authors/{id}",
    tag = "library",
    params(("id" = i64, Path, description = "Author ID")),
    responses(
        (status = 200, description = "Author with their books", body = Author),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Author>> {
    state
        .services
        .authors
        .find_one(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Author {} not found", id)))
}
