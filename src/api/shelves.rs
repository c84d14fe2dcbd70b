//! Shelf endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Book, NewShelf, Shelf},
    AppState,
};

use super::ValidatedJson;

/// List all shelves
#[utoipa::path(
    get,
    path = "/shelves",
    tag = "shelves",
    responses(
        (status = 200, description = "All shelves", body = Vec<Shelf>),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_shelves(State(state): State<AppState>) -> AppResult<Json<Vec<Shelf>>> {
    let shelves = state
        .services
        .shelves
        .list()
        .await
        .map_err(|e| e.context("Failed to fetch shelves"))?;
    Ok(Json(shelves))
}

/// Get a shelf by ID
#[utoipa::path(
    get,
    path = "/shelves/{id}",
    tag = "shelves",
    params(("id" = String, Path, description = "Shelf ID")),
    responses(
        (status = 200, description = "Shelf details", body = Shelf),
        (status = 404, description = "Shelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_shelf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Shelf>> {
    let shelf = state
        .services
        .shelves
        .get_by_id(&id)
        .await
        .map_err(|e| e.context("Failed to fetch shelf"))?;
    Ok(Json(shelf))
}

/// Create a shelf
#[utoipa::path(
    post,
    path = "/shelves",
    tag = "shelves",
    request_body = NewShelf,
    responses(
        (status = 201, description = "Shelf created", body = Shelf),
        (status = 400, description = "Invalid body", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_shelf(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<NewShelf>,
) -> AppResult<(StatusCode, Json<Shelf>)> {
    let shelf = state
        .services
        .shelves
        .create(&data)
        .await
        .map_err(|e| e.context("Failed to create shelf"))?;
    Ok((StatusCode::CREATED, Json(shelf)))
}

/// Delete a shelf and every book on it
#[utoipa::path(
    delete,
    path = "/shelves/{id}",
    tag = "shelves",
    params(("id" = String, Path, description = "Shelf ID")),
    responses(
        (status = 204, description = "Shelf deleted")
    )
)]
pub async fn delete_shelf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .services
        .shelves
        .delete(&id)
        .await
        .map_err(|e| e.context("Failed to delete shelf"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the books on a shelf
#[utoipa::path(
    get,
    path = "/shelves/{id}/books",
    tag = "shelves",
    params(("id" = String, Path, description = "Shelf ID")),
    responses(
        (status = 200, description = "Books on the shelf", body = Vec<Book>),
        (status = 404, description = "Shelf not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_shelf_books(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .shelves
        .books(&id)
        .await
        .map_err(|e| e.context("Failed to fetch books"))?;
    Ok(Json(books))
}
