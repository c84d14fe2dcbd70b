//! Wire normalization for records received from the API Gateway.
//!
//! Some deployments emit snake_case field names. Each field is looked up by its
//! camelCase key first, then its snake_case key; `null` counts as absent.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::api::ClientError;
use crate::models::{Book, Shelf};

fn field<'a>(record: &'a Value, camel: &str, snake: &str) -> Option<&'a Value> {
    let present = |key: &str| record.get(key).filter(|value| !value.is_null());
    present(camel).or_else(|| present(snake))
}

fn malformed(kind: &str, reason: impl std::fmt::Display) -> ClientError {
    ClientError::Decode(format!("malformed {} record: {}", kind, reason))
}

fn text(record: &Value, camel: &str, snake: &str) -> Option<String> {
    field(record, camel, snake).and_then(|value| value.as_str().map(str::to_string))
}

fn required_text(kind: &str, record: &Value, camel: &str, snake: &str) -> Result<String, ClientError> {
    text(record, camel, snake).ok_or_else(|| malformed(kind, format!("missing {}", camel)))
}

fn timestamp(kind: &str, record: &Value, camel: &str, snake: &str) -> Result<DateTime<Utc>, ClientError> {
    let raw = required_text(kind, record, camel, snake)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| malformed(kind, format!("{}: {}", camel, e)))
}

/// Build a [`Shelf`] from a wire record
pub fn normalize_shelf(record: &Value) -> Result<Shelf, ClientError> {
    Ok(Shelf {
        id: required_text("shelf", record, "id", "id")?,
        name: required_text("shelf", record, "name", "name")?,
        created_at: timestamp("shelf", record, "createdAt", "created_at")?,
    })
}

/// Build a [`Book`] from a wire record
pub fn normalize_book(record: &Value) -> Result<Book, ClientError> {
    let authors = field(record, "authors", "authors")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let page_count = field(record, "pageCount", "page_count")
        .and_then(Value::as_i64)
        .and_then(|count| i32::try_from(count).ok());

    // year sometimes arrives as a bare number
    let published_year = field(record, "publishedYear", "published_year").and_then(|value| match value {
        Value::String(year) => Some(year.clone()),
        Value::Number(year) => Some(year.to_string()),
        _ => None,
    });

    Ok(Book {
        id: required_text("book", record, "id", "id")?,
        isbn: text(record, "isbn", "isbn").unwrap_or_default(),
        title: required_text("book", record, "title", "title")?,
        authors,
        cover: text(record, "cover", "cover").unwrap_or_default(),
        page_count,
        published_year,
        shelf_id: required_text("book", record, "shelfId", "shelf_id")?,
        is_read: field(record, "isRead", "is_read")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        notes: text(record, "notes", "notes").unwrap_or_default(),
        added_at: timestamp("book", record, "addedAt", "added_at")?,
    })
}
