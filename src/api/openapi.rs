//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, categories, health, library};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Catalog API",
        version = "1.0.0",
        description = "Authors, categories and books of a library catalog",
        license(name = "Apache-2.0", url = "https://www.apache.org/licenses/LICENSE-2.0")
    ),
    servers(
        (url = "/api", description = "Catalog API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Authors
        authors::create_author,
        authors::update_author,
        authors::partial_update_author,
        authors::list_authors,
        authors::count_authors,
        authors::get_author,
        authors::delete_author,
        // Categories
        categories::create_category,
        categories::update_category,
        categories::partial_update_category,
        categories::list_categories,
        categories::count_categories,
        categories::get_category,
        categories::delete_category,
        // Books
        books::create_book,
        books::update_book,
        books::partial_update_book,
        books::list_books,
        books::count_books,
        books::get_book,
        books::delete_book,
        // Public catalog
        library::list_books,
        library::get_book_by_isbn,
        library::get_category,
        library::get_author,
    ),
    components(
        schemas(
            crate::models::Author,
            crate::models::AuthorInput,
            crate::models::AuthorPatch,
            crate::models::Category,
            crate::models::CategoryInput,
            crate::models::CategoryPatch,
            crate::models::Book,
            crate::models::BookInput,
            crate::models::BookPatch,
            crate::models::EntityRef,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Author management"),
        (name = "categories", description = "Category management"),
        (name = "books", description = "Book management"),
        (name = "library", description = "Public read-only catalog")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/authors",
            "/authors/{id}",
            "/categories/count",
            "/books/{id}",
            "/library/books/{isbn}/isbn",
            "/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
