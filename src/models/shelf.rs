//! Shelf model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A user-defined named grouping of books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: String,
    /// Display name, not unique
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Create shelf request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewShelf {
    #[validate(length(min = 1, message = "Shelf name cannot be empty"))]
    pub name: String,
}
