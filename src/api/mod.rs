//! API handlers for the Home Library REST endpoints

pub mod books;
pub mod health;
pub mod library;
pub mod openapi;
pub mod shelves;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    routing::{delete, get, patch},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{error::AppError, AppState};

/// JSON body extractor that rejects malformed bodies with a 400.
///
/// Typing is exact: `"true"` is not a boolean and `123` is not a string.
/// After deserializing, the `validator` rules on `T` are applied.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Build the application router with all routes under `/api`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Shelves
        .route("/shelves", get(shelves::list_shelves).post(shelves::create_shelf))
        .route("/shelves/:id", get(shelves::get_shelf).delete(shelves::delete_shelf))
        .route("/shelves/:id/books", get(shelves::list_shelf_books))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", get(books::get_book).delete(books::delete_book))
        .route("/books/:id/notes", patch(books::update_notes))
        .route("/books/:id/shelf", patch(books::update_shelf))
        .route("/books/:id/read-status", patch(books::update_read_status))
        // Whole collection
        .route("/library", delete(library::clear_library))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
