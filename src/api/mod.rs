//! API handlers for the library catalog REST endpoints

pub mod alert;
pub mod authors;
pub mod books;
pub mod categories;
pub mod extract;
pub mod health;
pub mod library;
pub mod openapi;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// Body id checks shared by full and partial updates
pub(crate) fn check_ids(entity: &'static str, path_id: i64, body_id: Option<i64>) -> AppResult<()> {
    match body_id {
        None => Err(AppError::bad_request_alert("Invalid id", entity, "idnull")),
        Some(body_id) if body_id != path_id => {
            Err(AppError::bad_request_alert("Invalid ID", entity, "idinvalid"))
        }
        Some(_) => Ok(()),
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route("/authors/count", get(authors::count_authors))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .patch(authors::partial_update_author)
                .delete(authors::delete_author),
        )
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/count", get(categories::count_categories))
        .route(
            "/categories/:id",
            get(categories::get_category)
                .put(categories::update_category)
                .patch(categories::partial_update_category)
                .delete(categories::delete_category),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/count", get(books::count_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .patch(books::partial_update_book)
                .delete(books::delete_book),
        )
        // Public catalog
        .route("/library/books", get(library::list_books))
        .route("/library/books/:isbn/isbn", get(library::get_book_by_isbn))
        .route("/library/categories/:id", get(library::get_category))
        .route("/library/authors/:id", get(library::get_author))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            alert::failure_alert_headers,
        ))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
