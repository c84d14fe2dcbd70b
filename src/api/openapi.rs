//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health, library, shelves};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Home Library API",
        version = "0.1.0",
        description = "Personal book catalogue REST API"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Shelves
        shelves::list_shelves,
        shelves::get_shelf,
        shelves::create_shelf,
        shelves::delete_shelf,
        shelves::list_shelf_books,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_notes,
        books::update_shelf,
        books::update_read_status,
        books::delete_book,
        // Library
        library::clear_library,
    ),
    components(
        schemas(
            crate::models::Shelf,
            crate::models::NewShelf,
            crate::models::Book,
            crate::models::NewBook,
            crate::models::UpdateNotes,
            crate::models::UpdateShelf,
            crate::models::UpdateReadStatus,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "shelves", description = "Shelf management"),
        (name = "books", description = "Book catalogue"),
        (name = "library", description = "Whole-collection operations")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
