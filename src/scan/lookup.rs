//! Public ISBN lookup

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{client::ClientError, config::LookupConfig, models::NewBook};

/// Metadata fetched for a scanned ISBN, shown on the preview screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPreview {
    pub isbn: String,
    pub title: String,
    pub authors: Vec<String>,
    pub cover: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_year: Option<String>,
}

impl BookPreview {
    /// Request body for adding the previewed book to a shelf
    pub fn into_new_book(self, shelf_id: impl Into<String>, is_read: bool) -> NewBook {
        NewBook {
            isbn: self.isbn,
            title: self.title,
            authors: self.authors,
            cover: self.cover,
            page_count: self.page_count,
            published_year: self.published_year,
            shelf_id: shelf_id.into(),
            is_read,
            notes: String::new(),
        }
    }
}

/// Source of book metadata. A miss and a failure look the same to callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookLookup: Send + Sync {
    async fn lookup(&self, isbn: &str) -> Option<BookPreview>;
}

/// Google Books volumes search
#[derive(Clone)]
pub struct GoogleBooksLookup {
    client: Client,
    base_url: String,
    placeholder_cover: String,
}

impl GoogleBooksLookup {
    pub fn new(config: &LookupConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            placeholder_cover: config.placeholder_cover.clone(),
        })
    }
}

#[async_trait]
impl BookLookup for GoogleBooksLookup {
    async fn lookup(&self, isbn: &str) -> Option<BookPreview> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", format!("isbn:{}", isbn))])
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(%isbn, status = %response.status(), "Book lookup rejected");
                return None;
            }
            Err(e) => {
                tracing::warn!(%isbn, error = %e, "Error fetching book info");
                return None;
            }
        };

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(%isbn, error = %e, "Malformed lookup response");
                return None;
            }
        };

        let preview = parse_volumes(isbn, &data, &self.placeholder_cover);
        if preview.is_none() {
            tracing::debug!(%isbn, "No match for ISBN");
        }
        preview
    }
}

/// Map the first volume of a search response onto a preview
pub fn parse_volumes(isbn: &str, data: &Value, placeholder_cover: &str) -> Option<BookPreview> {
    let total = data.get("totalItems").and_then(Value::as_i64).unwrap_or(0);
    if total <= 0 {
        return None;
    }
    let info = data.get("items")?.as_array()?.first()?.get("volumeInfo")?;

    let title = info
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .unwrap_or("Unknown Title")
        .to_string();

    let authors = info
        .get("authors")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect::<Vec<_>>()
        })
        .filter(|authors| !authors.is_empty())
        .unwrap_or_else(|| vec!["Unknown Author".to_string()]);

    let cover = info
        .get("imageLinks")
        .and_then(|links| links.get("thumbnail"))
        .and_then(Value::as_str)
        .map(|url| url.replacen("http:", "https:", 1))
        .unwrap_or_else(|| placeholder_cover.to_string());

    let page_count = info
        .get("pageCount")
        .and_then(Value::as_i64)
        .and_then(|count| i32::try_from(count).ok())
        .filter(|count| *count > 0);

    let published_year = info
        .get("publishedDate")
        .and_then(Value::as_str)
        .and_then(|date| date.split('-').next())
        .filter(|year| !year.is_empty())
        .map(str::to_string);

    Some(BookPreview {
        isbn: isbn.to_string(),
        title,
        authors,
        cover,
        page_count,
        published_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PLACEHOLDER: &str = "https://via.placeholder.com/128x192?text=No+Cover";

    #[test]
    fn test_parse_full_volume() {
        let data = json!({
            "totalItems": 1,
            "items": [{
                "volumeInfo": {
                    "title": "Sapiens",
                    "authors": ["Yuval Noah Harari"],
                    "imageLinks": { "thumbnail": "http://books.google.com/books/content?id=1" },
                    "pageCount": 464,
                    "publishedDate": "2015-02-10"
                }
            }]
        });

        let preview = parse_volumes("9780062316097", &data, PLACEHOLDER).unwrap();
        assert_eq!(preview.title, "Sapiens");
        assert_eq!(preview.authors, vec!["Yuval Noah Harari".to_string()]);
        assert_eq!(preview.cover, "https://books.google.com/books/content?id=1");
        assert_eq!(preview.page_count, Some(464));
        assert_eq!(preview.published_year.as_deref(), Some("2015"));
    }

    #[test]
    fn test_parse_sparse_volume() {
        let data = json!({ "totalItems": 1, "items": [{ "volumeInfo": {} }] });

        let preview = parse_volumes("111", &data, PLACEHOLDER).unwrap();
        assert_eq!(preview.title, "Unknown Title");
        assert_eq!(preview.authors, vec!["Unknown Author".to_string()]);
        assert_eq!(preview.cover, PLACEHOLDER);
        assert_eq!(preview.page_count, None);
        assert_eq!(preview.published_year, None);
    }

    #[test]
    fn test_parse_miss() {
        assert!(parse_volumes("111", &json!({ "totalItems": 0 }), PLACEHOLDER).is_none());
        assert!(parse_volumes("111", &json!({ "error": "bad" }), PLACEHOLDER).is_none());
        assert!(parse_volumes("111", &json!({ "totalItems": 2, "items": [] }), PLACEHOLDER).is_none());
    }

    #[test]
    fn test_into_new_book() {
        let preview = BookPreview {
            isbn: "111".to_string(),
            title: "Dune".to_string(),
            authors: vec!["Frank Herbert".to_string()],
            cover: PLACEHOLDER.to_string(),
            page_count: Some(412),
            published_year: Some("1965".to_string()),
        };

        let book = preview.into_new_book("shelf-1", true);
        assert_eq!(book.shelf_id, "shelf-1");
        assert!(book.is_read);
        assert_eq!(book.notes, "");
        assert_eq!(book.page_count, Some(412));
    }
}
