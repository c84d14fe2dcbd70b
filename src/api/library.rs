//! Whole-collection endpoints

use axum::{extract::State, http::StatusCode};

use crate::{error::AppResult, AppState};

/// Delete every book and shelf
#[utoipa::path(
    delete,
    path = "/library",
    tag = "library",
    responses(
        (status = 204, description = "Library cleared"),
        (status = 500, description = "Persistence failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn clear_library(State(state): State<AppState>) -> AppResult<StatusCode> {
    state
        .services
        .library
        .clear()
        .await
        .map_err(|e| e.context("Failed to clear library"))?;
    Ok(StatusCode::NO_CONTENT)
}
