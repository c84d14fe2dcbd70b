//! Book endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Book, NewBook, UpdateNotes, UpdateReadStatus, UpdateShelf},
    AppState,
};

use super::ValidatedJson;

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    let books = state
        .services
        .books
        .list()
        .await
        .map_err(|e| e.context("Failed to fetch books"))?;
    Ok(Json(books))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .get_by_id(&id)
        .await
        .map_err(|e| e.context("Failed to fetch book"))?;
    Ok(Json(book))
}

/// Add a book to a shelf
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = NewBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid body or unknown shelf", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state
        .services
        .books
        .create(&data)
        .await
        .map_err(|e| e.context("Failed to create book"))?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Replace a book's notes
#[utoipa::path(
    patch,
    path = "/books/{id}/notes",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateNotes,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "notes is not a string", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_notes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(data): ValidatedJson<UpdateNotes>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .update_notes(&id, &data.notes)
        .await
        .map_err(|e| e.context("Failed to update book notes"))?;
    Ok(Json(book))
}

/// Move a book to another shelf
#[utoipa::path(
    patch,
    path = "/books/{id}/shelf",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateShelf,
    responses(
        (status = 200, description = "Book moved", body = Book),
        (status = 400, description = "shelfId is not a string or names no shelf", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_shelf(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(data): ValidatedJson<UpdateShelf>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .move_to_shelf(&id, &data.shelf_id)
        .await
        .map_err(|e| e.context("Failed to update book shelf"))?;
    Ok(Json(book))
}

/// Mark a book read or unread
#[utoipa::path(
    patch,
    path = "/books/{id}/read-status",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    request_body = UpdateReadStatus,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "isRead is not a boolean", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_read_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(data): ValidatedJson<UpdateReadStatus>,
) -> AppResult<Json<Book>> {
    let book = state
        .services
        .books
        .update_read_status(&id, data.is_read)
        .await
        .map_err(|e| e.context("Failed to update read status"))?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(("id" = String, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state
        .services
        .books
        .delete(&id)
        .await
        .map_err(|e| e.context("Failed to delete book"))?;
    Ok(StatusCode::NO_CONTENT)
}
