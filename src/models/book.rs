//! Book (catalog entry) model and request bodies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A single catalog entry, belonging to exactly one shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    /// Not checksum-validated; duplicates are permitted
    pub isbn: String,
    pub title: String,
    pub authors: Vec<String>,
    /// Cover image URL
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<String>,
    pub shelf_id: String,
    pub is_read: bool,
    pub notes: String,
    pub added_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub isbn: String,
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: String,
    pub authors: Vec<String>,
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "pageCount must be a positive integer"))]
    pub page_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<String>,
    #[validate(length(min = 1, message = "shelfId cannot be empty"))]
    pub shelf_id: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub notes: String,
}

/// Body of `PATCH /api/books/:id/notes`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateNotes {
    pub notes: String,
}

/// Body of `PATCH /api/books/:id/shelf`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShelf {
    pub shelf_id: String,
}

/// Body of `PATCH /api/books/:id/read-status`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReadStatus {
    pub is_read: bool,
}
